#![forbid(unsafe_code)]
//! Umbrella crate re-exporting the pointview workspace.

pub use pointview_core as core;
pub use pointview_filters as filters;
pub use pointview_io as io;
pub use pointview_viewer as viewer;

pub mod prelude {
    pub use pointview_core::{Aabb, Colors, PointCloud};
    pub use pointview_filters::{
        depth_gradient, linear_upsample, segment_starts, upsample, voxel_downsample,
        DepthGradient, FilterError, UpsampleMode,
    };
    pub use pointview_io::{read_cloud, write_cloud, CloudFormat, IoError};
}
