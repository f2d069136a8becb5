use crate::camera::TurntableCamera;
use crate::config::ViewerConfig;
use crate::style::{ColorMode, MarkerSymbol};
use glam::Vec3;
use log::debug;
use pointview_core::{Colors, PointCloud};
use pointview_filters::DepthGradient;

pub const POINT_SIZE_MIN: u32 = 1;
pub const POINT_SIZE_MAX: u32 = 100;

/// Everything the user can do to the view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    SetPointSize(u32),
    SetSymbol(MarkerSymbol),
    SetColorMode(ColorMode),
    /// Pointer drag in screen points.
    Orbit { dx: f32, dy: f32 },
    /// Scroll steps; positive moves closer.
    Zoom(f32),
    ResetCamera,
}

/// What the viewer displays and how.
///
/// The point cloud is fixed at construction. Events only change rendering
/// parameters and the camera.
pub struct ViewerState {
    cloud: PointCloud,
    source: String,
    gradient: DepthGradient,
    gradient_colors: Option<Colors>,
    fallback_color: [f32; 3],
    point_size: u32,
    symbol: MarkerSymbol,
    color_mode: ColorMode,
    camera: TurntableCamera,
}

impl ViewerState {
    pub fn new(cloud: PointCloud, config: &ViewerConfig) -> Self {
        let camera = TurntableCamera::framing(&cloud.aabb());
        let reference = config
            .reference
            .unwrap_or_else(|| camera.home_eye().to_array());

        let mut state = Self {
            cloud,
            source: config.source.clone(),
            gradient: DepthGradient {
                reference,
                near: config.near_color,
                far: config.far_color,
            },
            gradient_colors: None,
            fallback_color: config.fallback_color,
            point_size: config.point_size.clamp(POINT_SIZE_MIN, POINT_SIZE_MAX),
            symbol: config.symbol,
            color_mode: ColorMode::Original,
            camera,
        };
        state.dispatch(ViewerEvent::SetColorMode(config.color_mode));
        state
    }

    /// Applies one event. Returns whether anything visible changed.
    pub fn dispatch(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::SetPointSize(size) => {
                let size = size.clamp(POINT_SIZE_MIN, POINT_SIZE_MAX);
                let changed = size != self.point_size;
                self.point_size = size;
                changed
            }
            ViewerEvent::SetSymbol(symbol) => {
                let changed = symbol != self.symbol;
                self.symbol = symbol;
                changed
            }
            ViewerEvent::SetColorMode(mode) => {
                if mode == ColorMode::Gradient && self.gradient_colors.is_none() {
                    debug!(
                        "computing depth gradient for {} points from {:?}",
                        self.cloud.len(),
                        self.gradient.reference
                    );
                    self.gradient_colors = Some(self.gradient.apply(&self.cloud));
                }
                let changed = mode != self.color_mode;
                self.color_mode = mode;
                changed
            }
            ViewerEvent::Orbit { dx, dy } => {
                if dx == 0.0 && dy == 0.0 {
                    return false;
                }
                self.camera.orbit(dx, dy);
                true
            }
            ViewerEvent::Zoom(steps) => {
                if steps == 0.0 {
                    return false;
                }
                self.camera.zoom(steps);
                true
            }
            ViewerEvent::ResetCamera => {
                self.camera.reset();
                true
            }
        }
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn point_size(&self) -> u32 {
        self.point_size
    }

    pub fn symbol(&self) -> MarkerSymbol {
        self.symbol
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    pub fn camera(&self) -> &TurntableCamera {
        &self.camera
    }

    pub fn gradient(&self) -> &DepthGradient {
        &self.gradient
    }

    pub fn gradient_reference(&self) -> Vec3 {
        Vec3::from_array(self.gradient.reference)
    }

    /// Colors for the active mode, or `None` when every point uses
    /// [`fallback_color`](Self::fallback_color).
    pub fn active_colors(&self) -> Option<&Colors> {
        match self.color_mode {
            ColorMode::Original => self.cloud.colors.as_ref(),
            ColorMode::Gradient => self.gradient_colors.as_ref(),
        }
    }

    pub fn fallback_color(&self) -> [f32; 3] {
        self.fallback_color
    }

    /// Color of point `i` under the active mode.
    pub fn point_color(&self, i: usize) -> [f32; 3] {
        self.active_colors()
            .map(|c| c.get(i))
            .unwrap_or(self.fallback_color)
    }
}
