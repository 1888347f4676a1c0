//! Menu bar rendering

use studio_core::{Modification, ModificationKind, PrimitiveKind};

use crate::state::{AppAction, SharedAppState};

/// Mesh formats offered by the import dialogs
const MESH_EXTENSIONS: &[&str] = &["stl", "STL", "obj", "OBJ", "gltf", "glb"];

/// Menu actions that need handling at app level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Reset the dock layout
    ResetLayout,
}

/// Render the menu bar and return any triggered action
pub fn render_menu_bar(ctx: &egui::Context, app_state: &SharedAppState) -> Option<MenuAction> {
    let mut menu_action = None;

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                file_menu(ui, ctx, app_state);
            });

            ui.menu_button("Edit", |ui| {
                if ui.button("Undo").clicked() {
                    app_state.lock().queue_action(AppAction::Undo);
                    ui.close_menu();
                }
                if ui.button("Redo").clicked() {
                    app_state.lock().queue_action(AppAction::Redo);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Delete Selection").clicked() {
                    queue_modification(app_state, ModificationKind::Delete);
                    ui.close_menu();
                }
                if ui.button("Select Base Model").clicked() {
                    queue_modification(
                        app_state,
                        ModificationKind::Select {
                            target: studio_core::MAIN_TARGET.to_string(),
                        },
                    );
                    ui.close_menu();
                }
                if ui.button("Reset Model").clicked() {
                    queue_modification(app_state, ModificationKind::Reset);
                    ui.close_menu();
                }
            });

            ui.menu_button("Add", |ui| {
                for kind in PrimitiveKind::BUILTIN {
                    let label = capitalize(kind.as_str());
                    if ui.button(label).clicked() {
                        app_state.lock().queue_action(AppAction::AddPrimitive(kind));
                        ui.close_menu();
                    }
                }
            });

            ui.menu_button("View", |ui| {
                if ui.button("Zoom to Fit").clicked() {
                    app_state.lock().queue_action(AppAction::ZoomToFit);
                    ui.close_menu();
                }
                if ui.button("Zoom to Selection").clicked() {
                    app_state.lock().queue_action(AppAction::ZoomToSelection);
                    ui.close_menu();
                }
                if ui.button("Toggle Box Selection").clicked() {
                    queue_modification(
                        app_state,
                        ModificationKind::BoundingBoxSelect { enabled: None },
                    );
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Reset Layout").clicked() {
                    menu_action = Some(MenuAction::ResetLayout);
                    ui.close_menu();
                }
            });
        });
    });

    menu_action
}

fn queue_modification(app_state: &SharedAppState, kind: ModificationKind) {
    app_state
        .lock()
        .queue_action(AppAction::Apply(Modification::new(kind)));
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn file_menu(ui: &mut egui::Ui, ctx: &egui::Context, app_state: &SharedAppState) {
    if ui.button("Import Mesh...").clicked() {
        if let Some(paths) = rfd::FileDialog::new()
            .add_filter("Mesh files", MESH_EXTENSIONS)
            .pick_files()
        {
            let mut state = app_state.lock();
            for path in paths {
                state.queue_action(AppAction::ImportMesh(path));
            }
        }
        ui.close_menu();
    }
    if ui.button("Load Base Model...").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Mesh files", MESH_EXTENSIONS)
            .pick_file()
        {
            app_state.lock().queue_action(AppAction::LoadBaseModel(path));
        }
        ui.close_menu();
    }
    ui.separator();
    if ui.button("Export Scene as STL...").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("STL", &["stl"])
            .set_file_name("scene.stl")
            .save_file()
        {
            app_state.lock().queue_action(AppAction::ExportScene(path));
        }
        ui.close_menu();
    }
    if ui.button("Export Selection as STL...").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("STL", &["stl"])
            .set_file_name("selection.stl")
            .save_file()
        {
            app_state.lock().queue_action(AppAction::ExportSelection(path));
        }
        ui.close_menu();
    }
    if ui.button("Save Screenshot...").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .set_file_name("viewport.png")
            .save_file()
        {
            app_state.lock().queue_action(AppAction::SaveScreenshot(path));
        }
        ui.close_menu();
    }
    ui.separator();
    if ui.button("Exit").clicked() {
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

#[cfg(target_arch = "wasm32")]
fn file_menu(ui: &mut egui::Ui, _ctx: &egui::Context, app_state: &SharedAppState) {
    if ui.button("Import Mesh...").clicked() {
        let app_state = app_state.clone();
        wasm_bindgen_futures::spawn_local(async move {
            if let Some(file) = rfd::AsyncFileDialog::new()
                .add_filter("Mesh files", MESH_EXTENSIONS)
                .pick_file()
                .await
            {
                let name = file.file_name();
                let data = file.read().await;
                app_state
                    .lock()
                    .queue_action(AppAction::ImportMeshBytes { name, data });
            }
        });
        ui.close_menu();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("torus"), "Torus");
        assert_eq!(capitalize(""), "");
    }
}
