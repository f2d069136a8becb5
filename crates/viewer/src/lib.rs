//! Interactive point cloud viewer.
//!
//! [`ViewerState`] holds everything the window shows and changes only through
//! [`ViewerState::dispatch`], so the viewer logic runs without a display.
//! [`app::ViewerApp`] wires the state into an eframe window.

#![forbid(unsafe_code)]

pub mod app;
pub mod camera;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod state;
pub mod style;

pub use app::{run, ViewerApp};
pub use camera::TurntableCamera;
pub use config::ViewerConfig;
pub use pipeline::TransformPlan;
pub use state::{ViewerEvent, ViewerState, POINT_SIZE_MAX, POINT_SIZE_MIN};
pub use style::{ColorMode, MarkerSymbol};
