use crate::FilterError;
use log::warn;
use pointview_core::{clamp_rgb, Colors, PointCloud};
use rayon::prelude::*;

/// Clouds below this size compute distances on the calling thread.
const PARALLEL_THRESHOLD: usize = 16_384;

/// Distance-to-reference coloring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthGradient {
    pub reference: [f32; 3],
    pub near: [f32; 3],
    pub far: [f32; 3],
}

impl Default for DepthGradient {
    /// White at the origin fading to black at the farthest point.
    fn default() -> Self {
        Self {
            reference: [0.0; 3],
            near: [1.0, 1.0, 1.0],
            far: [0.0, 0.0, 0.0],
        }
    }
}

impl DepthGradient {
    pub fn apply(&self, cloud: &PointCloud) -> Colors {
        depth_gradient(cloud, self.reference, self.near, self.far)
    }
}

fn distance(p: [f32; 3], reference: [f32; 3]) -> f32 {
    let dx = p[0] - reference[0];
    let dy = p[1] - reference[1];
    let dz = p[2] - reference[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Euclidean distance of every point to `reference`, min-max normalized to `[0, 1]`.
///
/// Returns [`FilterError::DegenerateRange`] when all points share one distance
/// (this includes single-point clouds). An empty cloud yields an empty vector.
pub fn normalized_depths(cloud: &PointCloud, reference: [f32; 3]) -> Result<Vec<f32>, FilterError> {
    let mut depths: Vec<f32> = if cloud.len() >= PARALLEL_THRESHOLD {
        (0..cloud.len())
            .into_par_iter()
            .map(|i| distance(cloud.point(i), reference))
            .collect()
    } else {
        cloud.iter_points().map(|p| distance(p, reference)).collect()
    };

    if depths.is_empty() {
        return Ok(depths);
    }

    let (min, max) = depths
        .iter()
        .filter(|d| d.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &d| {
            (lo.min(d), hi.max(d))
        });

    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return Err(FilterError::DegenerateRange {
            distance: if min.is_finite() { min } else { f32::NAN },
        });
    }

    for d in depths.iter_mut() {
        *d = ((*d - min) / range).clamp(0.0, 1.0);
    }
    Ok(depths)
}

/// Blends `near` into `far` by normalized distance from `reference`.
///
/// Each point gets `(1 - t) * near + t * far`, clamped into `[0, 1]`, where
/// `t` is its normalized depth. If the depth range is degenerate every point
/// gets `near`. Points with a non-finite position also get `near`.
pub fn depth_gradient(
    cloud: &PointCloud,
    reference: [f32; 3],
    near: [f32; 3],
    far: [f32; 3],
) -> Colors {
    let depths = match normalized_depths(cloud, reference) {
        Ok(depths) => depths,
        Err(err) => {
            warn!("{}; using the near color for all {} points", err, cloud.len());
            return Colors::uniform(cloud.len(), near);
        }
    };

    let mut colors = Colors::with_capacity(depths.len());
    for t in depths {
        let t = if t.is_nan() { 0.0 } else { t };
        let blended = [
            (1.0 - t) * near[0] + t * far[0],
            (1.0 - t) * near[1] + t * far[1],
            (1.0 - t) * near[2] + t * far[2],
        ];
        colors.push(clamp_rgb(blended));
    }
    colors
}
