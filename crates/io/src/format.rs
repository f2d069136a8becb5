use crate::{pcd, ply, xyzrgb, IoError, Result};
use log::info;
use pointview_core::PointCloud;
use std::path::Path;

/// Point cloud file formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudFormat {
    /// Stanford PLY, ascii or binary.
    Ply,
    /// PCL point cloud data, ascii or binary.
    Pcd,
    /// Whitespace separated `x y z r g b` rows, colors in 0-255.
    Xyzrgb,
}

impl CloudFormat {
    pub const ALL: [CloudFormat; 3] = [CloudFormat::Ply, CloudFormat::Pcd, CloudFormat::Xyzrgb];

    /// Picks the format from the file extension, case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        Self::from_extension(&extension)
    }

    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ply" => Ok(CloudFormat::Ply),
            "pcd" => Ok(CloudFormat::Pcd),
            "xyzrgb" | "txt" => Ok(CloudFormat::Xyzrgb),
            _ => Err(IoError::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CloudFormat::Ply => "PLY",
            CloudFormat::Pcd => "PCD",
            CloudFormat::Xyzrgb => "XYZRGB",
        }
    }

    pub fn read(self, path: impl AsRef<Path>) -> Result<PointCloud> {
        match self {
            CloudFormat::Ply => ply::read_ply(path),
            CloudFormat::Pcd => pcd::read_pcd(path),
            CloudFormat::Xyzrgb => xyzrgb::read_xyzrgb(path),
        }
    }

    /// Writes with the format's default encoding (ascii PLY, ascii PCD).
    pub fn write(self, path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
        match self {
            CloudFormat::Ply => ply::write_ply(path, cloud),
            CloudFormat::Pcd => pcd::write_pcd(path, cloud),
            CloudFormat::Xyzrgb => xyzrgb::write_xyzrgb(path, cloud),
        }
    }
}

/// Loads a point cloud, choosing the parser from the file extension.
pub fn read_cloud(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    let format = CloudFormat::from_path(path)?;
    let cloud = format.read(path)?;
    info!(
        "loaded {} points ({}, colors: {}) from {}",
        cloud.len(),
        format.name(),
        cloud.has_colors(),
        path.display()
    );
    Ok(cloud)
}

/// Saves a point cloud, choosing the writer from the file extension.
pub fn write_cloud(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<()> {
    let path = path.as_ref();
    let format = CloudFormat::from_path(path)?;
    format.write(path, cloud)?;
    info!(
        "wrote {} points ({}) to {}",
        cloud.len(),
        format.name(),
        path.display()
    );
    Ok(())
}

/// 0-255 byte to a unit channel.
pub(crate) fn channel_from_byte(v: f64) -> f32 {
    (v / 255.0).clamp(0.0, 1.0) as f32
}

/// Unit channel back to a byte, rounding to nearest.
pub(crate) fn channel_to_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointview_core::Colors;
    use tempfile::Builder;

    #[test]
    fn detects_known_extensions() {
        assert_eq!(CloudFormat::from_path("a/b/model.ply").unwrap(), CloudFormat::Ply);
        assert_eq!(CloudFormat::from_path("scan.PCD").unwrap(), CloudFormat::Pcd);
        assert_eq!(CloudFormat::from_path("rows.xyzrgb").unwrap(), CloudFormat::Xyzrgb);
        assert_eq!(CloudFormat::from_path("rows.txt").unwrap(), CloudFormat::Xyzrgb);
    }

    #[test]
    fn rejects_unknown_extensions() {
        match CloudFormat::from_path("mesh.obj") {
            Err(IoError::UnsupportedFormat { extension }) => assert_eq!(extension, "obj"),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
        assert!(matches!(
            CloudFormat::from_path("no_extension"),
            Err(IoError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn unsupported_format_checked_before_touching_disk() {
        let err = read_cloud("/definitely/not/here.las").unwrap_err();
        assert!(matches!(err, IoError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_cloud("/tmp/pointview_missing_file_0451.ply").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[test]
    fn read_write_dispatch_each_format() {
        let cloud = PointCloud::from_points(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]])
            .with_colors(Colors::from_rgb(&[[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]))
            .unwrap();

        for format in CloudFormat::ALL {
            let suffix = match format {
                CloudFormat::Ply => ".ply",
                CloudFormat::Pcd => ".pcd",
                CloudFormat::Xyzrgb => ".xyzrgb",
            };
            let tmp = Builder::new().suffix(suffix).tempfile().unwrap();
            write_cloud(tmp.path(), &cloud).unwrap();
            let loaded = read_cloud(tmp.path()).unwrap();
            assert_eq!(loaded.len(), 2, "{}", format.name());
            assert_eq!(loaded.x, cloud.x, "{}", format.name());
            assert_eq!(loaded.colors, cloud.colors, "{}", format.name());
        }
    }

    #[test]
    fn byte_channel_conversion() {
        assert_eq!(channel_from_byte(255.0), 1.0);
        assert_eq!(channel_from_byte(0.0), 0.0);
        assert_eq!(channel_from_byte(300.0), 1.0);
        assert_eq!(channel_to_byte(1.0), 255);
        assert_eq!(channel_to_byte(0.5), 128);
        assert_eq!(channel_to_byte(-1.0), 0);
    }
}
