//! History panel

use crate::panels::Panel;
use crate::state::{AppAction, SharedAppState, SharedViewportState};

/// Applied modifications, newest last, with the undo cursor marked
pub struct HistoryPanel;

impl HistoryPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HistoryPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for HistoryPanel {
    fn name(&self) -> &str {
        "History"
    }

    fn ui(&mut self, ui: &mut egui::Ui, _app_state: &SharedAppState) {
        ui.weak("History requires the 3D viewport");
    }

    fn ui_with_viewport(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        viewport_state: &SharedViewportState,
    ) {
        let state = viewport_state.lock();
        let history = state.viewport.editor().history();

        ui.horizontal(|ui| {
            if ui
                .add_enabled(history.can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                app_state.lock().queue_action(AppAction::Undo);
            }
            if ui
                .add_enabled(history.can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                app_state.lock().queue_action(AppAction::Redo);
            }
            ui.weak(format!("{} / {}", history.len(), history.capacity()));
        });
        ui.separator();

        if history.is_empty() {
            ui.weak("No modifications yet");
            return;
        }

        let current = history.index();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for (i, modification) in history.modifications().enumerate() {
                    let text = format!("{}. {}", i + 1, modification.description);
                    if i as isize > current {
                        // Undone entries stay until the next apply truncates them
                        ui.weak(text);
                    } else if i as isize == current {
                        ui.strong(text);
                    } else {
                        ui.label(text);
                    }
                }
            });
    }
}
