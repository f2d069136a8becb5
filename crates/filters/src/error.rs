use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("voxel size must be positive, got {0}")]
    InvalidVoxelSize(f32),

    /// Every point sits at the same distance from the reference, so depths
    /// cannot be normalized.
    #[error("all points are {distance} away from the reference; depth range is empty")]
    DegenerateRange { distance: f32 },

    #[error("cannot insert {per_segment} points per segment into {points} points")]
    UpsampleTooLarge { points: usize, per_segment: usize },
}
