use crate::style::{ColorMode, MarkerSymbol};

/// Start-up settings for the viewer window.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Label shown in the side panel, usually the file name.
    pub source: String,
    pub point_size: u32,
    pub symbol: MarkerSymbol,
    pub color_mode: ColorMode,
    pub near_color: [f32; 3],
    pub far_color: [f32; 3],
    /// Gradient reference position; `None` uses the camera's home eye position.
    pub reference: Option<[f32; 3]>,
    /// Color for points when the file carries none.
    pub fallback_color: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            point_size: 3,
            symbol: MarkerSymbol::Disc,
            color_mode: ColorMode::Original,
            near_color: [1.0, 0.85, 0.2],
            far_color: [0.15, 0.25, 0.9],
            reference: None,
            fallback_color: [0.8, 0.8, 0.8],
        }
    }
}

/// Parses `a,b,c` into three floats.
pub fn parse_triple(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected three comma separated numbers, got {:?}", s));
    }
    let mut out = [0.0f32; 3];
    for (slot, part) in out.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f32>()
            .map_err(|e| format!("invalid number {:?}: {}", part, e))?;
    }
    Ok(out)
}

/// Like [`parse_triple`], additionally requiring every channel in `[0, 1]`.
pub fn parse_color(s: &str) -> Result<[f32; 3], String> {
    let rgb = parse_triple(s)?;
    if rgb.iter().all(|c| (0.0..=1.0).contains(c)) {
        Ok(rgb)
    } else {
        Err(format!("color channels must lie in [0, 1], got {:?}", s))
    }
}
