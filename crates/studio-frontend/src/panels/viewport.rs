//! 3D Viewport panel

use glam::Vec2;
use studio_renderer::SelectionMode;

use crate::panels::Panel;
use crate::state::{AppAction, SharedAppState, SharedViewportState};

/// Marquee fill and outline
const MARQUEE_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(40, 90, 160, 40);
const MARQUEE_STROKE: egui::Color32 = egui::Color32::from_rgb(90, 160, 255);

/// 3D viewport panel
#[derive(Debug, Default)]
pub struct ViewportPanel;

impl ViewportPanel {
    pub fn new() -> Self {
        Self
    }

    fn toolbar(
        &self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        viewport_state: &SharedViewportState,
    ) {
        ui.horizontal(|ui| {
            if ui.button("Fit All").clicked() {
                app_state.lock().queue_action(AppAction::ZoomToFit);
            }
            if ui.button("Fit Selection").clicked() {
                app_state.lock().queue_action(AppAction::ZoomToSelection);
            }

            ui.separator();

            let mut state = viewport_state.lock();
            let box_mode = state.viewport.selection().mode() == SelectionMode::BoundingBox;
            if ui
                .selectable_label(box_mode, "Box Select")
                .on_hover_text("Drag to select every object inside a rectangle")
                .clicked()
            {
                let mode = if box_mode {
                    SelectionMode::Point
                } else {
                    SelectionMode::BoundingBox
                };
                state.viewport.set_selection_mode(mode);
            }

            let mut show_grid = state.viewport.config().grid.enabled;
            if ui.checkbox(&mut show_grid, "Grid").changed() {
                let mut config = state.viewport.config().clone();
                config.grid.enabled = show_grid;
                state.viewport.set_config(config);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let count = state.viewport.editor().store().len();
                let selected = state.viewport.editor().store().selected_objects().len();
                ui.weak(format!("{} objects, {} selected", count, selected));
            });
        });
    }
}

fn to_local(pos: egui::Pos2, rect: egui::Rect) -> Vec2 {
    Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y)
}

impl Panel for ViewportPanel {
    fn name(&self) -> &str {
        "3D Viewport"
    }

    fn needs_render_context(&self) -> bool {
        true
    }

    fn ui(&mut self, ui: &mut egui::Ui, _app_state: &SharedAppState) {
        // Fallback when no render context
        let available_size = ui.available_size();
        let (response, painter) =
            ui.allocate_painter(available_size, egui::Sense::click_and_drag());

        painter.rect_filled(response.rect, 0.0, egui::Color32::from_rgb(30, 30, 30));
        painter.text(
            response.rect.center(),
            egui::Align2::CENTER_CENTER,
            "3D Viewport\n(WebGPU not available)",
            egui::FontId::proportional(16.0),
            egui::Color32::GRAY,
        );
    }

    fn ui_with_render_context(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: &egui_wgpu::RenderState,
        viewport_state: &SharedViewportState,
    ) {
        self.toolbar(ui, app_state, viewport_state);

        // Main viewport area
        let available_size = ui.available_size();
        let width = available_size.x as u32;
        let height = available_size.y as u32;

        if width == 0 || height == 0 {
            return;
        }

        // Ensure texture and render
        let texture_id = {
            let mut state = viewport_state.lock();
            let mut egui_renderer = render_state.renderer.write();
            let tex_id = state.ensure_texture(width, height, &mut egui_renderer);
            state.render();
            tex_id
        };
        let Some(texture_id) = texture_id else {
            return;
        };

        // Display the rendered texture
        let response = ui.add(
            egui::Image::new(egui::load::SizedTexture::new(
                texture_id,
                [available_size.x, available_size.y],
            ))
            .sense(egui::Sense::click_and_drag()),
        );

        let rect = response.rect;
        let pointer = response
            .interact_pointer_pos()
            .or(response.hover_pos())
            .map(|p| to_local(p, rect));

        let mut state = viewport_state.lock();
        let vp = &mut state.viewport;

        // Point selection
        if response.clicked_by(egui::PointerButton::Primary)
            && let Some(pos) = pointer
        {
            vp.pointer_click(pos);
        }

        // Primary drag: marquee in box mode, orbit otherwise
        let box_mode = vp.selection().mode() == SelectionMode::BoundingBox;
        if box_mode {
            if response.drag_started_by(egui::PointerButton::Primary)
                && let Some(pos) = pointer
            {
                vp.drag_begin(pos);
            }
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pos) = pointer
            {
                vp.drag_update(pos);
            }
            if response.drag_stopped_by(egui::PointerButton::Primary)
                && let Some(pos) = pointer
            {
                vp.drag_end(pos);
            }
        } else if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            vp.orbit(Vec2::new(delta.x, delta.y));
        }

        // Pan with secondary or middle drag
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            let delta = response.drag_delta();
            vp.pan(Vec2::new(delta.x, delta.y));
        }

        // Scroll to zoom
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                vp.scroll_zoom(scroll);
            }
        }

        // Marquee overlay
        if let Some(marquee) = vp.marquee() {
            let (min, max) = marquee.rect();
            let overlay = egui::Rect::from_min_max(
                rect.min + egui::vec2(min.x, min.y),
                rect.min + egui::vec2(max.x, max.y),
            );
            let painter = ui.painter_at(rect);
            painter.rect_filled(overlay, 0.0, MARQUEE_FILL);
            painter.rect_stroke(overlay, 0.0, egui::Stroke::new(1.0, MARQUEE_STROKE));
        }

        // Keep animating while a debounced auto-fit is pending
        if vp.autofit_pending() {
            ui.ctx().request_repaint();
        }
    }
}
