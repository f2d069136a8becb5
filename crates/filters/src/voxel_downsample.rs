use crate::FilterError;
use hashbrown::HashMap;
use log::debug;
use pointview_core::{Colors, PointCloud};

#[derive(Default, Clone, Copy)]
struct VoxelAccum {
    sx: f64,
    sy: f64,
    sz: f64,
    sr: f64,
    sg: f64,
    sb: f64,
    n: usize,
}

/// Collapses every occupied voxel to the centroid of its points.
///
/// The grid starts at the minimum corner of the cloud's bounding box, so a
/// voxel edge at least as long as the box diagonal always yields a single
/// point (`f32::INFINITY` is accepted). Colors, when present, are averaged
/// per voxel. Non-finite points are dropped. Output is ordered by voxel index.
pub fn voxel_downsample(cloud: &PointCloud, voxel_size: f32) -> Result<PointCloud, FilterError> {
    if voxel_size.is_nan() || voxel_size <= 0.0 {
        return Err(FilterError::InvalidVoxelSize(voxel_size));
    }

    let aabb = cloud.aabb();
    if aabb.is_empty() {
        return Ok(PointCloud::new());
    }
    let origin = aabb.min;
    let cell = |v: f32, axis: usize| ((v - origin[axis]) / voxel_size).floor() as i64;

    let mut bins: HashMap<(i64, i64, i64), VoxelAccum> = HashMap::new();

    for i in 0..cloud.len() {
        let [px, py, pz] = cloud.point(i);
        if !px.is_finite() || !py.is_finite() || !pz.is_finite() {
            continue;
        }

        let key = (cell(px, 0), cell(py, 1), cell(pz, 2));

        let entry = bins.entry(key).or_default();
        entry.sx += px as f64;
        entry.sy += py as f64;
        entry.sz += pz as f64;
        if let Some([r, g, b]) = cloud.color(i) {
            entry.sr += r as f64;
            entry.sg += g as f64;
            entry.sb += b as f64;
        }
        entry.n += 1;
    }

    let mut keys: Vec<(i64, i64, i64)> = bins.keys().copied().collect();
    keys.sort_unstable();

    let mut x = Vec::with_capacity(keys.len());
    let mut y = Vec::with_capacity(keys.len());
    let mut z = Vec::with_capacity(keys.len());
    let mut colors = cloud.colors.as_ref().map(|_| Colors::with_capacity(keys.len()));

    for key in keys {
        let Some(a) = bins.get(&key) else { continue };
        let denom = a.n as f64;
        x.push((a.sx / denom) as f32);
        y.push((a.sy / denom) as f32);
        z.push((a.sz / denom) as f32);
        if let Some(colors) = colors.as_mut() {
            colors.push([
                (a.sr / denom) as f32,
                (a.sg / denom) as f32,
                (a.sb / denom) as f32,
            ]);
        }
    }

    debug!(
        "voxel downsample {} -> {} points (voxel {})",
        cloud.len(),
        x.len(),
        voxel_size
    );

    let mut out = PointCloud::from_xyz(x, y, z);
    out.colors = colors;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::voxel_downsample;
    use crate::FilterError;
    use pointview_core::{Colors, PointCloud};
    use proptest::prelude::*;

    #[test]
    fn voxel_downsample_reduces_points() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, 0.5, 0.0, 0.5, 0.0, 0.5, 0.0, 0.5],
            vec![0.0, 0.0, 0.5, 0.5, 0.0, 0.0, 0.5, 0.5],
            vec![0.0, 0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 0.5],
        );
        let out = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out.x[0] - 0.25).abs() < 1e-6);
        assert!((out.y[0] - 0.25).abs() < 1e-6);
        assert!((out.z[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn voxel_downsample_empty_cloud() {
        let out = voxel_downsample(&PointCloud::new(), 1.0).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn voxel_downsample_single_point() {
        let cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        let out = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.point(0), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn voxel_downsample_averages_colors() {
        let cloud = PointCloud::from_points(&[[0.0; 3], [0.1; 3], [5.0; 3]])
            .with_colors(Colors::from_rgb(&[
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 0.0],
            ]))
            .unwrap();
        let out = voxel_downsample(&cloud, 1.0).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.color(0), Some([0.5, 0.0, 0.5]));
        assert_eq!(out.color(1), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn voxel_downsample_skips_non_finite() {
        let cloud = PointCloud::from_points(&[[f32::NAN, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        let out = voxel_downsample(&cloud, 0.5).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.point(0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn infinite_voxel_collapses_to_centroid() {
        let cloud = PointCloud::from_points(&[[-3.0, 0.0, 0.0], [3.0, 2.0, -4.0]]);
        let out = voxel_downsample(&cloud, f32::INFINITY).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.point(0), [0.0, 1.0, -2.0]);
    }

    #[test]
    fn rejects_invalid_voxel_sizes() {
        let cloud = PointCloud::from_points(&[[0.0; 3]]);
        for size in [0.0, -1.0, f32::NAN] {
            assert!(matches!(
                voxel_downsample(&cloud, size),
                Err(FilterError::InvalidVoxelSize(_))
            ));
        }
    }

    proptest! {
        #[test]
        fn voxel_downsample_never_increases_points(
            pts in prop::collection::vec((-100.0f32..100.0f32, -100.0f32..100.0f32, -100.0f32..100.0f32), 1..3000),
            voxel_size in 0.01f32..10.0f32,
        ) {
            let points: Vec<[f32; 3]> = pts.iter().map(|p| [p.0, p.1, p.2]).collect();
            let cloud = PointCloud::from_points(&points);
            let out = voxel_downsample(&cloud, voxel_size).unwrap();
            prop_assert!(out.len() <= cloud.len());
            prop_assert!(!out.is_empty());
        }

        #[test]
        fn huge_voxel_yields_one_point(
            pts in prop::collection::vec((-100.0f32..100.0f32, -100.0f32..100.0f32, -100.0f32..100.0f32), 1..500),
        ) {
            let points: Vec<[f32; 3]> = pts.iter().map(|p| [p.0, p.1, p.2]).collect();
            let cloud = PointCloud::from_points(&points);
            let out = voxel_downsample(&cloud, 1.0e6).unwrap();
            prop_assert_eq!(out.len(), 1);
        }

        #[test]
        fn tiny_voxel_keeps_distinct_points(
            pts in prop::collection::vec((-100i32..100, -100i32..100, -100i32..100), 1..300),
        ) {
            let points: Vec<[f32; 3]> = pts.iter().map(|p| [p.0 as f32, p.1 as f32, p.2 as f32]).collect();
            let mut distinct = pts.clone();
            distinct.sort_unstable();
            distinct.dedup();
            let cloud = PointCloud::from_points(&points);
            let out = voxel_downsample(&cloud, 1.0e-3).unwrap();
            prop_assert_eq!(out.len(), distinct.len());
        }
    }
}
