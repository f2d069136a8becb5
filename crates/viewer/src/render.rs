//! Scatter rendering through an `egui::Painter`.
//!
//! Points are projected on the CPU, culled, sorted back to front and emitted
//! as one shape per point.

use crate::camera::TurntableCamera;
use crate::state::ViewerState;
use crate::style::MarkerSymbol;
use eframe::egui::{self, pos2, vec2, Color32, Pos2, Rect, Shape, Stroke};
use glam::{Vec3, Vec4};

/// A point after projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    pub index: usize,
    pub screen: Pos2,
    /// Distance along the view axis; larger is farther.
    pub depth: f32,
}

/// Projects every finite point that lands inside `viewport`, sorted far to near.
pub fn project_points(
    camera: &TurntableCamera,
    viewport: Rect,
    points: impl Iterator<Item = [f32; 3]>,
) -> Vec<Splat> {
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 {
        return Vec::new();
    }
    let view_proj = camera.view_projection(viewport.width() / viewport.height());

    let mut splats: Vec<Splat> = points
        .enumerate()
        .filter_map(|(index, p)| {
            let p = Vec3::from_array(p);
            if !p.is_finite() {
                return None;
            }
            let clip: Vec4 = view_proj * p.extend(1.0);
            if clip.w <= 0.0 {
                return None;
            }
            let ndc = clip.truncate() / clip.w;
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || !(0.0..=1.0).contains(&ndc.z) {
                return None;
            }
            let screen = pos2(
                viewport.left() + (ndc.x + 1.0) * 0.5 * viewport.width(),
                viewport.top() + (1.0 - ndc.y) * 0.5 * viewport.height(),
            );
            Some(Splat {
                index,
                screen,
                depth: clip.w,
            })
        })
        .collect();

    splats.sort_unstable_by(|a, b| b.depth.total_cmp(&a.depth));
    splats
}

pub fn to_color32(rgb: [f32; 3]) -> Color32 {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    Color32::from_rgb(r, g, b)
}

/// Shapes for one marker of diameter `size` centered on `center`.
pub fn marker_shapes(symbol: MarkerSymbol, center: Pos2, size: f32, color: Color32) -> Vec<Shape> {
    let r = 0.5 * size.max(1.0);
    let stroke = if symbol.is_stroked() {
        Stroke::new((size / 6.0).max(1.0), color)
    } else {
        Stroke::NONE
    };

    match symbol {
        MarkerSymbol::Disc => vec![Shape::circle_filled(center, r, color)],
        MarkerSymbol::Ring => vec![Shape::circle_stroke(center, r, stroke)],
        MarkerSymbol::Square => vec![Shape::rect_filled(
            Rect::from_center_size(center, vec2(2.0 * r, 2.0 * r)),
            0.0,
            color,
        )],
        MarkerSymbol::Diamond => vec![Shape::convex_polygon(
            vec![
                center + vec2(0.0, -r),
                center + vec2(r, 0.0),
                center + vec2(0.0, r),
                center + vec2(-r, 0.0),
            ],
            color,
            stroke,
        )],
        MarkerSymbol::TriangleUp => vec![Shape::convex_polygon(
            vec![
                center + vec2(0.0, -r),
                center + vec2(0.866 * r, 0.5 * r),
                center + vec2(-0.866 * r, 0.5 * r),
            ],
            color,
            stroke,
        )],
        MarkerSymbol::Cross => vec![
            Shape::line_segment([center + vec2(-r, -r), center + vec2(r, r)], stroke),
            Shape::line_segment([center + vec2(-r, r), center + vec2(r, -r)], stroke),
        ],
        MarkerSymbol::Plus => vec![
            Shape::line_segment([center + vec2(-r, 0.0), center + vec2(r, 0.0)], stroke),
            Shape::line_segment([center + vec2(0.0, -r), center + vec2(0.0, r)], stroke),
        ],
    }
}

/// Draws the scatter for `state` into `rect`. Returns how many points were drawn.
pub fn paint_scatter(painter: &egui::Painter, rect: Rect, state: &ViewerState) -> usize {
    let splats = project_points(state.camera(), rect, state.cloud().iter_points());
    let size = state.point_size() as f32;
    let symbol = state.symbol();

    let mut shapes = Vec::with_capacity(splats.len());
    for splat in &splats {
        let color = to_color32(state.point_color(splat.index));
        shapes.extend(marker_shapes(symbol, splat.screen, size, color));
    }
    painter.extend(shapes);
    splats.len()
}
