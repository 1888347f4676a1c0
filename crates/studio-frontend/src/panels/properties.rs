//! Properties panel: selection details, material editing and remediation

use studio_core::{Color, Material, MaterialPatch, RemediationOp, SceneObject};

use crate::panels::Panel;
use crate::state::{AppAction, SharedAppState, SharedViewportState};

/// Properties panel for the primary selection
pub struct PropertiesPanel;

impl PropertiesPanel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PropertiesPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn to_color32(color: Color) -> egui::Color32 {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgb(byte(color.r), byte(color.g), byte(color.b))
}

fn from_color32(color: egui::Color32) -> Color {
    Color::rgb(
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    )
}

/// Fields of `edited` that differ from `original`
pub(crate) fn material_patch(original: &Material, edited: &Material) -> MaterialPatch {
    fn changed<T: PartialEq + Copy>(a: T, b: T) -> Option<T> {
        (a != b).then_some(b)
    }
    MaterialPatch {
        color: changed(original.color, edited.color),
        metalness: changed(original.metalness, edited.metalness),
        roughness: changed(original.roughness, edited.roughness),
        emissive: changed(original.emissive, edited.emissive),
        emissive_intensity: changed(original.emissive_intensity, edited.emissive_intensity),
        transparent: changed(original.transparent, edited.transparent),
        opacity: changed(original.opacity, edited.opacity),
        wireframe: changed(original.wireframe, edited.wireframe),
    }
}

fn object_details(ui: &mut egui::Ui, object: &SceneObject, is_base: bool) {
    egui::Grid::new("object_details")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Name:");
            ui.label(&object.name);
            ui.end_row();

            ui.label("Type:");
            if is_base {
                ui.label(format!("{} (base model)", object.shape.type_tag()));
            } else {
                ui.label(object.shape.type_tag());
            }
            ui.end_row();

            ui.label("Id:");
            ui.monospace(object.id.as_str());
            ui.end_row();

            let t = &object.transform;
            let euler = t.euler();
            ui.label("Position:");
            ui.label(format!(
                "{:.2}, {:.2}, {:.2}",
                t.position.x, t.position.y, t.position.z
            ));
            ui.end_row();

            ui.label("Rotation:");
            ui.label(format!(
                "{:.1}°, {:.1}°, {:.1}°",
                euler.x.to_degrees(),
                euler.y.to_degrees(),
                euler.z.to_degrees()
            ));
            ui.end_row();

            ui.label("Scale:");
            ui.label(format!("{:.2}, {:.2}, {:.2}", t.scale.x, t.scale.y, t.scale.z));
            ui.end_row();

            if let Some(stats) = object.stats {
                ui.label("Mesh:");
                ui.label(format!(
                    "{} vertices, {} faces",
                    stats.vertex_count, stats.face_count
                ));
                ui.end_row();
            }
        });
}

/// Material widgets; returns the edited copy
fn material_editor(ui: &mut egui::Ui, material: &Material) -> Material {
    let mut edited = material.clone();
    egui::Grid::new("material_editor")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            ui.label("Color:");
            let mut color = to_color32(edited.color);
            if ui.color_edit_button_srgba(&mut color).changed() {
                edited.color = from_color32(color);
            }
            ui.end_row();

            ui.label("Metalness:");
            ui.add(egui::Slider::new(&mut edited.metalness, 0.0..=1.0));
            ui.end_row();

            ui.label("Roughness:");
            ui.add(egui::Slider::new(&mut edited.roughness, 0.0..=1.0));
            ui.end_row();

            ui.label("Emissive:");
            let mut emissive = to_color32(edited.emissive);
            if ui.color_edit_button_srgba(&mut emissive).changed() {
                edited.emissive = from_color32(emissive);
            }
            ui.end_row();

            ui.label("Intensity:");
            ui.add(egui::Slider::new(&mut edited.emissive_intensity, 0.0..=5.0));
            ui.end_row();

            ui.label("Transparent:");
            ui.checkbox(&mut edited.transparent, "");
            ui.end_row();

            ui.label("Opacity:");
            ui.add_enabled(
                edited.transparent,
                egui::Slider::new(&mut edited.opacity, 0.0..=1.0),
            );
            ui.end_row();

            ui.label("Wireframe:");
            ui.checkbox(&mut edited.wireframe, "");
            ui.end_row();
        });
    edited
}

impl Panel for PropertiesPanel {
    fn name(&self) -> &str {
        "Properties"
    }

    fn ui(&mut self, ui: &mut egui::Ui, _app_state: &SharedAppState) {
        // Fallback when no viewport exists
        ui.weak("Properties require the 3D viewport");
    }

    fn ui_with_viewport(
        &mut self,
        ui: &mut egui::Ui,
        app_state: &SharedAppState,
        viewport_state: &SharedViewportState,
    ) {
        let state = viewport_state.lock();
        let store = state.viewport.editor().store();

        let Some(selected_id) = store.selected_object() else {
            ui.weak("No object selected");
            return;
        };
        let Some(object) = store.get(selected_id) else {
            ui.weak("Selected object not found");
            return;
        };
        let selection_len = store.selected_objects().len();

        ui.heading("Object");
        ui.separator();
        object_details(ui, object, store.is_base(selected_id));
        if selection_len > 1 {
            ui.weak(format!("{} objects selected", selection_len));
        }

        ui.add_space(8.0);
        ui.heading("Material");
        ui.separator();
        let edited = material_editor(ui, &object.material);
        let patch = material_patch(&object.material, &edited);
        if !patch.is_empty() {
            app_state
                .lock()
                .queue_action(AppAction::UpdateMaterial(patch));
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            ui.add_space(8.0);
            ui.heading("Export");
            ui.separator();
            ui.horizontal(|ui| {
                for format in studio_renderer::ExportFormat::ALL {
                    let ext = format.extension();
                    if ui.button(ext.to_uppercase()).clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter(ext.to_uppercase(), &[ext])
                            .set_file_name(format!("{}.{}", object.name, ext))
                            .save_file()
                    {
                        app_state.lock().queue_action(AppAction::ExportObject {
                            id: selected_id.clone(),
                            format,
                            path,
                        });
                    }
                }
            });
        }

        ui.add_space(8.0);
        ui.heading("Remediation");
        ui.separator();
        let mut app = app_state.lock();
        egui::ComboBox::from_label("Operation")
            .selected_text(app.remediation_op.label())
            .show_ui(ui, |ui| {
                for op in RemediationOp::ALL {
                    ui.selectable_value(&mut app.remediation_op, op, op.label());
                }
            });
        ui.add(egui::Slider::new(&mut app.remediation_strength, 0.0..=1.0).text("Strength"));
        if ui.button("Run").clicked() {
            let action = AppAction::Remediate {
                id: selected_id.clone(),
                operation: app.remediation_op,
                strength: app.remediation_strength,
            };
            app.queue_action(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_material_yields_empty_patch() {
        let material = Material::default();
        assert!(material_patch(&material, &material.clone()).is_empty());
    }

    #[test]
    fn test_patch_carries_only_edited_fields() {
        let original = Material::default();
        let edited = Material {
            roughness: 0.2,
            wireframe: true,
            ..original.clone()
        };
        let patch = material_patch(&original, &edited);
        assert_eq!(patch.roughness, Some(0.2));
        assert_eq!(patch.wireframe, Some(true));
        assert_eq!(patch.color, None);
        assert_eq!(original.merged(&patch), edited);
    }

    #[test]
    fn test_color_conversion_round_trips_bytes() {
        let color = egui::Color32::from_rgb(12, 200, 255);
        assert_eq!(to_color32(from_color32(color)), color);
    }
}
