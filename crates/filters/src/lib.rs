#![forbid(unsafe_code)]

pub mod error;
pub mod gradient;
pub mod upsample;
pub mod voxel_downsample;

pub use error::FilterError;
pub use gradient::{depth_gradient, normalized_depths, DepthGradient};
pub use upsample::{linear_upsample, segment_starts, upsample, UpsampleMode, MAX_PER_SEGMENT};
pub use voxel_downsample::voxel_downsample;
