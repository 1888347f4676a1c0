//! Command panel: free-text commands and their replies

use crate::panels::Panel;
use crate::state::{AppAction, ChatRole, SharedAppState};

const EXAMPLES: &[&str] = &[
    "add sphere",
    "rotate 45 degrees around z",
    "scale up",
    "select main",
    "zoom to fit",
    "undo",
];

/// Chat-style command panel
pub struct CommandsPanel {
    input: String,
}

impl CommandsPanel {
    pub fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    fn submit(&mut self, app_state: &SharedAppState) {
        let text = std::mem::take(&mut self.input);
        if !text.trim().is_empty() {
            app_state.lock().queue_action(AppAction::SubmitCommand(text));
        }
    }
}

impl Default for CommandsPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel for CommandsPanel {
    fn name(&self) -> &str {
        "Commands"
    }

    fn ui(&mut self, ui: &mut egui::Ui, app_state: &SharedAppState) {
        // Input row pinned to the bottom
        egui::TopBottomPanel::bottom("command_input")
            .show_separator_line(true)
            .show_inside(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add(
                        egui::TextEdit::singleline(&mut self.input)
                            .hint_text("Type a command...")
                            .desired_width(ui.available_width() - 60.0),
                    );
                    let entered =
                        response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    if entered || ui.button("Send").clicked() {
                        self.submit(app_state);
                        response.request_focus();
                    }
                });
            });

        let state = app_state.lock();
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                if state.chat().is_empty() {
                    ui.weak("Try one of:");
                    for example in EXAMPLES {
                        ui.weak(format!("  {}", example));
                    }
                    return;
                }
                for line in state.chat() {
                    match line.role {
                        ChatRole::User => {
                            ui.label(egui::RichText::new(format!("> {}", line.text)).strong());
                        }
                        ChatRole::System => {
                            ui.label(&line.text);
                        }
                    }
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use crate::state::create_shared_state;

    use super::*;

    #[test]
    fn test_submit_queues_command_and_clears_input() {
        let app_state = create_shared_state();
        let mut panel = CommandsPanel::new();
        panel.input = "add cube".into();
        panel.submit(&app_state);
        assert!(panel.input.is_empty());
        let actions = app_state.lock().take_pending_actions();
        assert!(matches!(&actions[..], [AppAction::SubmitCommand(text)] if text == "add cube"));
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let app_state = create_shared_state();
        let mut panel = CommandsPanel::new();
        panel.input = "   ".into();
        panel.submit(&app_state);
        assert!(app_state.lock().take_pending_actions().is_empty());
    }
}
