use crate::render::paint_scatter;
use crate::state::{ViewerEvent, ViewerState, POINT_SIZE_MAX, POINT_SIZE_MIN};
use crate::style::{ColorMode, MarkerSymbol};
use anyhow::anyhow;
use eframe::egui;
use log::{debug, info};

const WINDOW_SIZE: [f32; 2] = [1280.0, 800.0];
// One notch of a typical mouse wheel, in points.
const SCROLL_PER_STEP: f32 = 120.0;

/// eframe application around a [`ViewerState`].
///
/// Widgets never touch the state directly. Each frame collects
/// [`ViewerEvent`]s and dispatches them once the panels are laid out.
pub struct ViewerApp {
    state: ViewerState,
    drawn: usize,
}

impl ViewerApp {
    pub fn new(state: ViewerState) -> Self {
        Self { state, drawn: 0 }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    fn controls(&self, ui: &mut egui::Ui, events: &mut Vec<ViewerEvent>) {
        ui.heading("pointview");
        ui.label(self.state.source());
        ui.label(format!(
            "{} points ({} drawn)",
            self.state.cloud().len(),
            self.drawn
        ));
        ui.separator();

        let mut size = self.state.point_size();
        if ui
            .add(egui::Slider::new(&mut size, POINT_SIZE_MIN..=POINT_SIZE_MAX).text("Point size"))
            .changed()
        {
            events.push(ViewerEvent::SetPointSize(size));
        }

        let mut symbol = self.state.symbol();
        egui::ComboBox::from_label("Symbol")
            .selected_text(symbol.label())
            .show_ui(ui, |ui| {
                for candidate in MarkerSymbol::ALL {
                    ui.selectable_value(&mut symbol, candidate, candidate.label());
                }
            });
        if symbol != self.state.symbol() {
            events.push(ViewerEvent::SetSymbol(symbol));
        }

        let mut mode = self.state.color_mode();
        egui::ComboBox::from_label("Colors")
            .selected_text(mode.label())
            .show_ui(ui, |ui| {
                for candidate in ColorMode::ALL {
                    ui.selectable_value(&mut mode, candidate, candidate.label());
                }
            });
        if mode != self.state.color_mode() {
            events.push(ViewerEvent::SetColorMode(mode));
        }

        ui.separator();
        if ui.button("Reset view").clicked() {
            events.push(ViewerEvent::ResetCamera);
        }
        ui.small("Drag to orbit, scroll to zoom, double-click to reset.");
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events = Vec::new();

        egui::SidePanel::left("controls")
            .resizable(false)
            .show(ctx, |ui| self.controls(ui, &mut events));

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::from_gray(16)))
            .show(ctx, |ui| {
                let (response, painter) =
                    ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

                if response.double_clicked() {
                    events.push(ViewerEvent::ResetCamera);
                } else if response.dragged() {
                    let delta = response.drag_delta();
                    events.push(ViewerEvent::Orbit {
                        dx: delta.x,
                        dy: delta.y,
                    });
                }
                if response.hovered() {
                    let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                    if scroll != 0.0 {
                        events.push(ViewerEvent::Zoom(scroll / SCROLL_PER_STEP));
                    }
                }

                self.drawn = paint_scatter(&painter, response.rect, &self.state);
            });

        let mut changed = false;
        for event in events {
            debug!("{:?}", event);
            changed |= self.state.dispatch(event);
        }
        if changed {
            ctx.request_repaint();
        }
    }
}

/// Opens the viewer window and blocks until it is closed.
pub fn run(state: ViewerState) -> anyhow::Result<()> {
    info!(
        "opening viewer for {} ({} points)",
        state.source(),
        state.cloud().len()
    );
    let title = format!("pointview - {}", state.source());
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(title),
        ..Default::default()
    };

    eframe::run_native(
        "pointview",
        options,
        Box::new(move |_cc| Box::new(ViewerApp::new(state))),
    )
    .map_err(|e| anyhow!("viewer window failed: {e}"))
}
