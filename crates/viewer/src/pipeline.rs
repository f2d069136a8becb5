use log::info;
use pointview_core::PointCloud;
use pointview_filters::{upsample, voxel_downsample, FilterError, UpsampleMode};

/// Transformations applied between loading and display.
///
/// Downsampling runs first, then upsampling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformPlan {
    pub downsample: Option<f32>,
    pub upsample: Option<UpsampleMode>,
}

impl TransformPlan {
    pub fn is_identity(&self) -> bool {
        self.downsample.is_none() && self.upsample.is_none()
    }

    /// Runs the plan, returning a new cloud; `cloud` is left untouched.
    pub fn apply(&self, cloud: &PointCloud) -> Result<PointCloud, FilterError> {
        let mut current = cloud.clone();

        if let Some(voxel_size) = self.downsample {
            current = voxel_downsample(&current, voxel_size)?;
            info!(
                "voxel downsample ({}): {} -> {} points",
                voxel_size,
                cloud.len(),
                current.len()
            );
        }

        if let Some(mode) = self.upsample {
            let before = current.len();
            current = upsample(&current, mode)?;
            info!("upsample ({:?}): {} -> {} points", mode, before, current.len());
        }

        Ok(current)
    }
}
