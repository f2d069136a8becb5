use crate::{Aabb, CloudError};

/// An ordered set of 3D points with optional per-point RGB colors.
///
/// Coordinates are stored as separate `x`, `y`, `z` columns. When `colors`
/// is present it holds exactly one entry per point, each channel in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

/// Per-point colors, channels normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
}

impl Colors {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
        }
    }

    /// Builds colors from `[r, g, b]` triples, clamping every channel into `[0, 1]`.
    pub fn from_rgb(rgb: &[[f32; 3]]) -> Self {
        let mut colors = Self::with_capacity(rgb.len());
        for &c in rgb {
            colors.push(c);
        }
        colors
    }

    /// Same value for `n` points.
    pub fn uniform(n: usize, rgb: [f32; 3]) -> Self {
        let [r, g, b] = clamp_rgb(rgb);
        Self {
            r: vec![r; n],
            g: vec![g; n],
            b: vec![b; n],
        }
    }

    /// Appends one color, clamped into `[0, 1]`. NaN channels become 0.
    pub fn push(&mut self, rgb: [f32; 3]) {
        let [r, g, b] = clamp_rgb(rgb);
        self.r.push(r);
        self.g.push(g);
        self.b.push(b);
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.r.len(), self.g.len());
        debug_assert_eq!(self.r.len(), self.b.len());
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, i: usize) -> [f32; 3] {
        [self.r[i], self.g[i], self.b[i]]
    }

    pub fn iter(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.r
            .iter()
            .zip(&self.g)
            .zip(&self.b)
            .map(|((r, g), b)| [*r, *g, *b])
    }

    fn check_channels(&self) -> Result<(), CloudError> {
        if self.r.len() != self.g.len() || self.r.len() != self.b.len() {
            return Err(CloudError::ColorChannelMismatch {
                r: self.r.len(),
                g: self.g.len(),
                b: self.b.len(),
            });
        }
        Ok(())
    }
}

/// Clamps each channel into `[0, 1]`; NaN maps to 0.
pub fn clamp_rgb(rgb: [f32; 3]) -> [f32; 3] {
    rgb.map(|c| if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) })
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());

        for p in points {
            x.push(p[0]);
            y.push(p[1]);
            z.push(p[2]);
        }

        Self::from_xyz(x, y, z)
    }

    /// Attaches colors, enforcing one color per point.
    pub fn with_colors(mut self, colors: Colors) -> Result<Self, CloudError> {
        colors.check_channels()?;
        if colors.len() != self.len() {
            return Err(CloudError::ColorCountMismatch {
                points: self.len(),
                colors: colors.len(),
            });
        }
        self.colors = Some(colors);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    pub fn color(&self, i: usize) -> Option<[f32; 3]> {
        self.colors.as_ref().map(|c| c.get(i))
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self { x, y, z, colors }
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
