use pointview_core::PointCloud;
use pointview_filters::DepthGradient;
use pointview_io::write_cloud;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    // A 20x20 sheet tilted away from the viewer
    let mut points = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            let (u, v) = (i as f32 * 0.1, j as f32 * 0.1);
            points.push([u, v, -v]);
        }
    }
    let cloud = PointCloud::from_points(&points);

    let gradient = DepthGradient {
        reference: [1.0, 0.0, 3.0],
        near: [1.0, 0.85, 0.2],
        far: [0.15, 0.25, 0.9],
    };
    let colors = gradient.apply(&cloud);
    let colored = cloud.with_colors(colors)?;

    let out = std::env::temp_dir().join("depth_gradient.ply");
    write_cloud(&out, &colored)?;
    println!("Wrote {} colored points to {}", colored.len(), out.display());
    Ok(())
}
