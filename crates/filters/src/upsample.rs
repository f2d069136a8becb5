//! Densifying an ordered point sequence by interpolating between neighbours.
//!
//! Points are treated as a polyline in storage order; no spatial search is
//! involved.

use crate::FilterError;
use log::debug;
use pointview_core::{Colors, PointCloud};

/// Largest accepted number of points inserted per segment.
pub const MAX_PER_SEGMENT: usize = 1024;

/// How [`upsample`] treats consecutive point pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsampleMode {
    /// Insert `per_segment` evenly spaced points strictly inside every
    /// consecutive pair.
    Interpolate { per_segment: usize },
    /// Keep only the first point of every consecutive pair. The result has
    /// one point fewer than the input and adds nothing new.
    SegmentStarts,
}

impl Default for UpsampleMode {
    fn default() -> Self {
        UpsampleMode::Interpolate { per_segment: 1 }
    }
}

pub fn upsample(cloud: &PointCloud, mode: UpsampleMode) -> Result<PointCloud, FilterError> {
    match mode {
        UpsampleMode::Interpolate { per_segment } => linear_upsample(cloud, per_segment),
        UpsampleMode::SegmentStarts => Ok(segment_starts(cloud)),
    }
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Inserts `per_segment` interpolated points between every consecutive pair.
///
/// For `n` input points the output holds `n + (n - 1) * per_segment` points
/// in the original order: each input point is followed by the points at
/// `t = k / (per_segment + 1)` for `k` in `1..=per_segment` towards its
/// successor. Colors are interpolated the same way.
///
/// `per_segment` above [`MAX_PER_SEGMENT`], or an output length that does
/// not fit in `usize`, is rejected with [`FilterError::UpsampleTooLarge`].
pub fn linear_upsample(cloud: &PointCloud, per_segment: usize) -> Result<PointCloud, FilterError> {
    let n = cloud.len();
    let too_large = FilterError::UpsampleTooLarge {
        points: n,
        per_segment,
    };
    if per_segment > MAX_PER_SEGMENT {
        return Err(too_large);
    }
    if n < 2 || per_segment == 0 {
        return Ok(cloud.clone());
    }

    let out_len = (n - 1)
        .checked_mul(per_segment)
        .and_then(|inserted| inserted.checked_add(n))
        .ok_or(too_large)?;
    let mut x = Vec::with_capacity(out_len);
    let mut y = Vec::with_capacity(out_len);
    let mut z = Vec::with_capacity(out_len);
    let mut colors = cloud.colors.as_ref().map(|_| Colors::with_capacity(out_len));
    let steps = (per_segment + 1) as f32;

    let mut emit = |p: [f32; 3], c: Option<[f32; 3]>| {
        x.push(p[0]);
        y.push(p[1]);
        z.push(p[2]);
        if let (Some(colors), Some(c)) = (colors.as_mut(), c) {
            colors.push(c);
        }
    };

    for i in 0..n - 1 {
        let (p0, p1) = (cloud.point(i), cloud.point(i + 1));
        let (c0, c1) = (cloud.color(i), cloud.color(i + 1));
        emit(p0, c0);
        for k in 1..=per_segment {
            let t = k as f32 / steps;
            let c = c0.zip(c1).map(|(a, b)| lerp3(a, b, t));
            emit(lerp3(p0, p1, t), c);
        }
    }
    emit(cloud.point(n - 1), cloud.color(n - 1));

    debug!(
        "linear upsample {} -> {} points ({} per segment)",
        n,
        x.len(),
        per_segment
    );

    let mut out = PointCloud::from_xyz(x, y, z);
    out.colors = colors;
    Ok(out)
}

/// Returns the first point of every consecutive pair, i.e. all but the last
/// point. Empty for clouds of zero or one point.
pub fn segment_starts(cloud: &PointCloud) -> PointCloud {
    let keep: Vec<usize> = (0..cloud.len().saturating_sub(1)).collect();
    cloud.select(&keep)
}
