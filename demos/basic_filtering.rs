use pointview_core::PointCloud;
use pointview_filters::{linear_upsample, voxel_downsample, FilterError};

fn main() -> Result<(), FilterError> {
    // Create a synthetic point cloud: 1000 random-ish points
    let n = 1000;
    let x: Vec<f32> = (0..n).map(|i| (i as f32 * 0.731) % 10.0).collect();
    let y: Vec<f32> = (0..n).map(|i| (i as f32 * 0.419) % 10.0).collect();
    let z: Vec<f32> = (0..n).map(|i| (i as f32 * 0.257) % 10.0).collect();
    let cloud = PointCloud::from_xyz(x, y, z);
    println!("Original cloud: {} points", cloud.len());

    let downsampled = voxel_downsample(&cloud, 1.0)?;
    println!("After voxel downsample (size=1.0): {} points", downsampled.len());

    let upsampled = linear_upsample(&downsampled, 2)?;
    println!("After linear upsample (k=2): {} points", upsampled.len());

    let aabb = upsampled.aabb();
    println!("Bounding box: min={:?}, max={:?}", aabb.min, aabb.max);
    Ok(())
}
