use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CloudError {
    #[error("color count {colors} does not match point count {points}")]
    ColorCountMismatch { points: usize, colors: usize },

    #[error("color channels have mismatched lengths (r={r}, g={g}, b={b})")]
    ColorChannelMismatch { r: usize, g: usize, b: usize },
}
