//! UI panels

mod commands;
mod history;
mod properties;
mod viewport;

pub use commands::CommandsPanel;
pub use history::HistoryPanel;
pub use properties::PropertiesPanel;
pub use viewport::ViewportPanel;

use crate::state::{SharedAppState, SharedViewportState};

/// Panel trait for dockable UI panels
pub trait Panel {
    /// Panel name for tab title
    fn name(&self) -> &str;

    /// Draw the panel UI
    fn ui(&mut self, ui: &mut egui::Ui, app_state: &SharedAppState);

    /// Draw with access to the scene (inspectors, history)
    fn ui_with_viewport(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        viewport_state: &SharedViewportState,
    ) {
        let _ = viewport_state;
        self.ui(ui, app_state);
    }

    /// Draw with render context (for 3D viewport)
    fn ui_with_render_context(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        render_state: &egui_wgpu::RenderState,
        viewport_state: &SharedViewportState,
    ) {
        let _ = render_state;
        self.ui_with_viewport(ui, app_state, viewport_state);
    }

    /// Whether this panel needs render context
    fn needs_render_context(&self) -> bool {
        false
    }
}
