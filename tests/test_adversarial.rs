//! Adversarial edge-case integration tests.
//!
//! Degenerate, boundary and malformed inputs across the whole stack: no
//! panics, and errors where the input cannot be used.

use pointview::prelude::*;
use pointview::viewer::{ColorMode, ViewerConfig, ViewerEvent, ViewerState};
use std::fs;
use tempfile::TempDir;

// ────────────────── PointCloud core ──────────────────

#[test]
fn empty_cloud_operations() {
    let cloud = PointCloud::new();
    assert!(cloud.is_empty());
    assert!(cloud.iter_points().next().is_none());
    assert!(cloud.aabb().is_empty());
    assert!(cloud.select(&[]).is_empty());
}

#[test]
fn cloud_with_nan_and_inf_values() {
    let cloud = PointCloud::from_xyz(
        vec![f32::NAN, f32::INFINITY, 2.0],
        vec![0.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0],
    );
    let aabb = cloud.aabb();
    assert!(aabb.contains(&[2.0, 0.0, 0.0]));
    assert_eq!(aabb.min, [2.0, 0.0, 0.0]);
}

#[test]
fn mismatched_color_count_is_an_error() {
    let cloud = PointCloud::from_points(&[[0.0; 3], [1.0; 3]]);
    assert!(cloud.with_colors(Colors::uniform(3, [0.5; 3])).is_err());
}

// ────────────────── Filters ──────────────────

#[test]
fn filters_on_empty_cloud() {
    let empty = PointCloud::new();
    assert!(voxel_downsample(&empty, 0.1).unwrap().is_empty());
    assert!(linear_upsample(&empty, 3).unwrap().is_empty());
    assert!(segment_starts(&empty).is_empty());
    assert!(depth_gradient(&empty, [0.0; 3], [1.0; 3], [0.0; 3]).is_empty());
}

#[test]
fn invalid_voxel_sizes() {
    let cloud = PointCloud::from_points(&[[0.0; 3]]);
    for size in [0.0, -1.0, f32::NAN] {
        assert!(matches!(
            voxel_downsample(&cloud, size),
            Err(FilterError::InvalidVoxelSize(_))
        ));
    }
    assert_eq!(voxel_downsample(&cloud, f32::INFINITY).unwrap().len(), 1);
}

#[test]
fn single_point_filters() {
    let cloud = PointCloud::from_points(&[[4.0, 5.0, 6.0]]);
    assert_eq!(linear_upsample(&cloud, 10).unwrap(), cloud);
    assert!(segment_starts(&cloud).is_empty());
    let colors = depth_gradient(&cloud, [0.0; 3], [0.1, 0.2, 0.3], [1.0; 3]);
    assert_eq!(colors.get(0), [0.1, 0.2, 0.3]);
}

#[test]
fn oversized_upsample_is_an_error() {
    let cloud = PointCloud::from_points(&[[0.0; 3], [1.0; 3]]);
    assert!(matches!(
        linear_upsample(&cloud, usize::MAX),
        Err(FilterError::UpsampleTooLarge { .. })
    ));
}

#[test]
fn duplicate_points_interpolate_in_place() {
    let cloud = PointCloud::from_points(&[[1.0; 3], [1.0; 3]]);
    let out = linear_upsample(&cloud, 4).unwrap();
    assert_eq!(out.len(), 6);
    assert!(out.iter_points().all(|p| p == [1.0; 3]));
}

// ────────────────── I/O ──────────────────

fn write(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        read_cloud(dir.path().join("nope.ply")),
        Err(IoError::Io(_))
    ));
}

#[test]
fn malformed_inputs_are_parse_errors() {
    let dir = TempDir::new().unwrap();
    let cases: [(&str, &[u8]); 8] = [
        ("short_row.xyzrgb", b"0 0 0 255 255\n"),
        ("bad_number.txt", b"0 0 zero 1 2 3\n"),
        ("no_magic.ply", b"format ascii 1.0\nend_header\n"),
        (
            "truncated.ply",
            b"ply\nformat binary_little_endian 1.0\nelement vertex 2\nproperty float x\nproperty float y\nproperty float z\nend_header\n\0\0\0\0",
        ),
        (
            "bad_data.pcd",
            b"VERSION .7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 1\nHEIGHT 1\nPOINTS 1\nDATA binary_compressed\n",
        ),
        (
            "huge_count.ply",
            b"ply\nformat ascii 1.0\nelement vertex 18446744073709551615\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
        ),
        (
            "huge_points.pcd",
            b"FIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nPOINTS 18446744073709551615\nDATA binary\n",
        ),
        (
            "zero_count.pcd",
            b"FIELDS y z x\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 0\nPOINTS 1\nDATA ascii\n1 2\n",
        ),
    ];
    for (name, contents) in cases {
        let path = write(&dir, name, contents);
        assert!(
            matches!(read_cloud(&path), Err(IoError::Parse { .. })),
            "{} should fail to parse",
            name
        );
    }
}

#[test]
fn xyzrgb_skips_blank_and_comment_lines() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "c.xyzrgb", b"# header\n\n1 2 3 0 0 0\n   \n");
    assert_eq!(read_cloud(&path).unwrap().len(), 1);
}

// ────────────────── Viewer state ──────────────────

#[test]
fn viewer_on_empty_cloud() {
    let mut state = ViewerState::new(PointCloud::new(), &ViewerConfig::default());
    assert!(state.camera().distance.is_finite());
    state.dispatch(ViewerEvent::SetColorMode(ColorMode::Gradient));
    assert_eq!(state.active_colors().map(|c| c.len()), Some(0));
    state.dispatch(ViewerEvent::Zoom(1e6));
    state.dispatch(ViewerEvent::Orbit { dx: 1e9, dy: -1e9 });
    assert!(state.camera().eye().is_finite());
}
