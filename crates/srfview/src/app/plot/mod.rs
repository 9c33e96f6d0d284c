//! The interactive plot: legend panel, status bar and the surface plot
//! itself, drawn with egui every frame from the viewer state.
//!
//! The drawn epoch only changes when a [`RedrawRequested`] message arrives,
//! which is what makes overlay clearing lazy: switching cumulative mode off
//! leaves the overlays on screen until the next navigation or axis key.

pub mod scale;

use crate::lib::srf::Frame;
use crate::lib::viewer::{AspectMode, BoundsMode, Direction, ViewerState};
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin, EguiPrimaryContextPass};
use scale::{tick_label, tick_step, ticks, DataBounds, PlotMapper};

/// Marks that a state change requires the next render pass to refresh the
/// drawn epoch.
#[derive(Message)]
pub struct RedrawRequested;

/// Y extent the plot displayed last frame; this is what gets captured when
/// the bounds are frozen.
#[derive(Resource, Clone, Copy)]
pub struct PlotExtent {
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for PlotExtent {
    fn default() -> Self {
        Self {
            y_min: 0.0,
            y_max: 1.0,
        }
    }
}

/// Plugin that sets up the plot UI systems
pub struct PlotPanelPlugin;

impl Plugin for PlotPanelPlugin {
    fn build(&self, app: &mut App) {
        // Add bevy_egui plugin if not already added
        if !app.is_plugin_added::<EguiPlugin>() {
            app.add_plugins(EguiPlugin::default());
        }

        app.add_message::<RedrawRequested>()
            .init_resource::<PlotExtent>()
            .add_systems(Startup, request_initial_draw)
            .add_systems(EguiPrimaryContextPass, plot_panel);
    }
}

/// The first epoch must show surface 0 without waiting for a key press.
fn request_initial_draw(mut redraws: MessageWriter<RedrawRequested>) {
    redraws.write(RedrawRequested);
}

const PLOT_TITLE: &str = "Surfaces: 2D-Plot";

const CURVE_COLORS: [egui::Color32; 10] = [
    egui::Color32::from_rgb(0x1f, 0x77, 0xb4),
    egui::Color32::from_rgb(0xff, 0x7f, 0x0e),
    egui::Color32::from_rgb(0x2c, 0xa0, 0x2c),
    egui::Color32::from_rgb(0xd6, 0x27, 0x28),
    egui::Color32::from_rgb(0x94, 0x67, 0xbd),
    egui::Color32::from_rgb(0x8c, 0x56, 0x4b),
    egui::Color32::from_rgb(0xe3, 0x77, 0xc2),
    egui::Color32::from_rgb(0x7f, 0x7f, 0x7f),
    egui::Color32::from_rgb(0xbc, 0xbd, 0x22),
    egui::Color32::from_rgb(0x17, 0xbe, 0xcf),
];

const REFERENCE_COLOR: egui::Color32 = egui::Color32::from_gray(150);
const PLOT_BACKGROUND: egui::Color32 = egui::Color32::from_gray(24);
const GRID_COLOR: egui::Color32 = egui::Color32::from_gray(56);
const AXIS_COLOR: egui::Color32 = egui::Color32::from_gray(140);
const TEXT_COLOR: egui::Color32 = egui::Color32::from_gray(210);

fn curve_color(slot: usize) -> egui::Color32 {
    CURVE_COLORS[slot % CURVE_COLORS.len()]
}

/// System that repaints the whole viewer UI from the current state.
fn plot_panel(
    mut contexts: EguiContexts,
    mut state: ResMut<ViewerState>,
    mut redraws: MessageReader<RedrawRequested>,
    mut extent: ResMut<PlotExtent>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    if redraws.read().count() > 0 {
        state.refresh_epoch();
    }

    legend_panel(ctx, &state);
    status_bar(ctx, &state);
    egui::CentralPanel::default().show(ctx, |ui| {
        draw_plot(ui, &state, &mut extent);
    });
    Ok(())
}

const KEY_HELP: [(&str, &str); 10] = [
    ("space", "next surface"),
    ("r", "reverse direction"),
    ("0-9", "step 2^n surfaces"),
    ("f", "first surface"),
    ("l", "last surface"),
    ("d", "overlay visited surfaces"),
    ("a", "1:1 aspect ratio"),
    ("b", "freeze y range"),
    ("s", "save view as png"),
    ("q", "quit"),
];

/// Legend lives in its own panel so it never overlaps the plotted data.
fn legend_panel(ctx: &egui::Context, state: &ViewerState) {
    egui::SidePanel::right("legend")
        .resizable(false)
        .default_width(180.0)
        .show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Surfaces");
            ui.separator();

            for (slot, &index) in state.drawn_indices().iter().enumerate() {
                let frame = &state.frames().frames()[index];
                legend_entry(ui, curve_color(slot), &frame.label(), false);
            }
            if let Some(frame) = state.reference_frame() {
                legend_entry(ui, REFERENCE_COLOR, &format!("saved: {}", frame.label()), true);
            }

            ui.separator();
            egui::CollapsingHeader::new("Keys")
                .default_open(false)
                .show(ui, |ui| {
                    for (key, action) in KEY_HELP {
                        ui.horizontal(|ui| {
                            ui.monospace(format!("[{key}]"));
                            ui.label(action);
                        });
                    }
                });
        });
}

fn legend_entry(ui: &mut egui::Ui, color: egui::Color32, label: &str, dashed: bool) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(22.0, 12.0), egui::Sense::hover());
        let stroke = egui::Stroke::new(2.0, color);
        let line = [rect.left_center(), rect.right_center()];
        if dashed {
            ui.painter()
                .extend(egui::Shape::dashed_line(&line, stroke, 4.0, 3.0));
        } else {
            ui.painter().line_segment(line, stroke);
        }
        ui.label(label);
    });
}

fn status_bar(ctx: &egui::Context, state: &ViewerState) {
    egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!(
                "surface {}/{}",
                state.current_index + 1,
                state.frame_count()
            ));
            ui.separator();
            ui.label(state.current_frame().label());
            ui.separator();
            ui.label(format!("step {}", state.step_size));
            ui.separator();
            ui.label(match state.direction {
                Direction::Forward => "forward",
                Direction::Backward => "backward",
            });
            if state.cumulative {
                ui.separator();
                ui.label("overlay");
            }
            if matches!(state.bounds, BoundsMode::Fixed { .. }) {
                ui.separator();
                ui.label("fixed y");
            }
            if state.aspect == AspectMode::Equal {
                ui.separator();
                ui.label("1:1");
            }
        });
    });
}

fn draw_plot(ui: &mut egui::Ui, state: &ViewerState, extent: &mut PlotExtent) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let outer = response.rect;

    // Margins leave room for the title, tick labels and axis titles.
    let plot_rect = egui::Rect::from_min_max(
        egui::pos2(outer.left() + 64.0, outer.top() + 30.0),
        egui::pos2(outer.right() - 16.0, outer.bottom() - 48.0),
    );
    if plot_rect.width() <= 0.0 || plot_rect.height() <= 0.0 {
        return;
    }

    let epoch: Vec<&Frame> = state
        .drawn_indices()
        .iter()
        .map(|&index| &state.frames().frames()[index])
        .collect();
    let reference_frame = state.reference_frame();

    let mut bounds = DataBounds::covering(epoch.iter().copied().chain(reference_frame))
        .unwrap_or(DataBounds {
            x_min: 0.0,
            x_max: 1.0,
            y_min: 0.0,
            y_max: 1.0,
        });
    bounds.ensure_nonzero();
    bounds.pad(0.05);
    if let BoundsMode::Fixed { y_min, y_max } = state.bounds {
        bounds.set_y(y_min, y_max);
    }
    if state.aspect == AspectMode::Equal {
        bounds.equalize_aspect(plot_rect.width(), plot_rect.height());
    }

    // Publish what is actually on screen, for the next bounds freeze.
    extent.y_min = bounds.y_min;
    extent.y_max = bounds.y_max;

    let mapper = PlotMapper::new(bounds, plot_rect);

    painter.rect_filled(plot_rect, egui::CornerRadius::ZERO, PLOT_BACKGROUND);
    draw_grid(&painter, &mapper, &bounds, plot_rect);

    // With fixed bounds the data can leave the visible range.
    let curves = painter.with_clip_rect(plot_rect.expand(1.0));
    for (slot, frame) in epoch.iter().enumerate() {
        let points: Vec<egui::Pos2> = frame
            .points
            .iter()
            .map(|p| mapper.to_screen(p.x, p.y))
            .collect();
        if points.len() >= 2 {
            curves.add(egui::Shape::line(
                points,
                egui::Stroke::new(1.6, curve_color(slot)),
            ));
        }
    }
    if let Some(frame) = reference_frame {
        let points: Vec<egui::Pos2> = frame
            .points
            .iter()
            .map(|p| mapper.to_screen(p.x, p.y))
            .collect();
        if points.len() >= 2 {
            curves.extend(egui::Shape::dashed_line(
                &points,
                egui::Stroke::new(1.4, REFERENCE_COLOR),
                6.0,
                4.0,
            ));
        }
    }

    painter.rect_stroke(
        plot_rect,
        egui::CornerRadius::ZERO,
        egui::Stroke::new(1.0, AXIS_COLOR),
        egui::StrokeKind::Middle,
    );
    draw_decorations(&painter, outer, plot_rect);
}

fn draw_grid(painter: &egui::Painter, mapper: &PlotMapper, bounds: &DataBounds, rect: egui::Rect) {
    let font = egui::FontId::proportional(11.0);
    let grid_stroke = egui::Stroke::new(1.0, GRID_COLOR);

    let x_step = tick_step(bounds.x_span(), (rect.width() / 90.0).max(2.0) as usize);
    for value in ticks(bounds.x_min, bounds.x_max, x_step) {
        let x = mapper.to_screen(value, bounds.y_min).x;
        painter.line_segment(
            [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
            grid_stroke,
        );
        painter.text(
            egui::pos2(x, rect.bottom() + 4.0),
            egui::Align2::CENTER_TOP,
            tick_label(value, x_step),
            font.clone(),
            TEXT_COLOR,
        );
    }

    let y_step = tick_step(bounds.y_span(), (rect.height() / 50.0).max(2.0) as usize);
    for value in ticks(bounds.y_min, bounds.y_max, y_step) {
        let y = mapper.to_screen(bounds.x_min, value).y;
        painter.line_segment(
            [egui::pos2(rect.left(), y), egui::pos2(rect.right(), y)],
            grid_stroke,
        );
        painter.text(
            egui::pos2(rect.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            tick_label(value, y_step),
            font.clone(),
            TEXT_COLOR,
        );
    }
}

fn draw_decorations(painter: &egui::Painter, outer: egui::Rect, plot_rect: egui::Rect) {
    painter.text(
        egui::pos2(plot_rect.center().x, outer.top() + 6.0),
        egui::Align2::CENTER_TOP,
        PLOT_TITLE,
        egui::FontId::proportional(15.0),
        TEXT_COLOR,
    );
    painter.text(
        egui::pos2(plot_rect.center().x, outer.bottom() - 20.0),
        egui::Align2::CENTER_TOP,
        "x in nm",
        egui::FontId::proportional(13.0),
        TEXT_COLOR,
    );

    let galley = painter.layout_no_wrap(
        "y in nm".to_owned(),
        egui::FontId::proportional(13.0),
        TEXT_COLOR,
    );
    let pos = egui::pos2(
        outer.left() + 4.0,
        plot_rect.center().y + galley.size().x / 2.0,
    );
    painter.add(
        egui::epaint::TextShape::new(pos, galley, TEXT_COLOR)
            .with_angle(-std::f32::consts::FRAC_PI_2),
    );
}
