//! Dock layout and tab viewer

use egui_dock::{DockState, NodeIndex, TabViewer};

use crate::panels::{CommandsPanel, HistoryPanel, Panel, PropertiesPanel, ViewportPanel};
use crate::state::{SharedAppState, SharedViewportState};

/// Panel types for the dock system
pub enum PanelType {
    Viewport(ViewportPanel),
    Commands(CommandsPanel),
    Properties(PropertiesPanel),
    History(HistoryPanel),
}

impl PanelType {
    fn panel_mut(&mut self) -> &mut dyn Panel {
        match self {
            PanelType::Viewport(p) => p,
            PanelType::Commands(p) => p,
            PanelType::Properties(p) => p,
            PanelType::History(p) => p,
        }
    }

    pub fn name(&mut self) -> String {
        self.panel_mut().name().to_string()
    }
}

/// Tab viewer for dock area
pub struct StudioTabViewer<'a> {
    pub app_state: &'a SharedAppState,
    pub render_state: Option<&'a egui_wgpu::RenderState>,
    pub viewport_state: &'a Option<SharedViewportState>,
}

impl TabViewer for StudioTabViewer<'_> {
    type Tab = PanelType;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        tab.name().into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        let panel = tab.panel_mut();
        match (self.render_state, self.viewport_state) {
            (Some(render_state), Some(viewport_state)) if panel.needs_render_context() => {
                panel.ui_with_render_context(ui, self.app_state, render_state, viewport_state);
            }
            (_, Some(viewport_state)) => {
                panel.ui_with_viewport(ui, self.app_state, viewport_state);
            }
            _ => panel.ui(ui, self.app_state),
        }
    }

    fn closeable(&mut self, _tab: &mut Self::Tab) -> bool {
        false
    }
}

/// Create the default dock layout
pub fn create_dock_layout() -> DockState<PanelType> {
    let mut dock_state = DockState::new(vec![PanelType::Viewport(ViewportPanel::new())]);

    // Get the main surface
    let surface = dock_state.main_surface_mut();

    // Split right for properties and history
    let [_viewport, right] = surface.split_right(
        NodeIndex::root(),
        0.75,
        vec![PanelType::Properties(PropertiesPanel::new())],
    );
    surface.split_below(right, 0.6, vec![PanelType::History(HistoryPanel::new())]);

    // Split left for the command panel
    let [_left, _viewport] = surface.split_left(
        NodeIndex::root(),
        0.25,
        vec![PanelType::Commands(CommandsPanel::new())],
    );

    dock_state
}
