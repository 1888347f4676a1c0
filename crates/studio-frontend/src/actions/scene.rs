//! Scene action handlers

use studio_core::{
    MaterialPatch, MeshSource, Modification, ModificationKind, ObjectId, PrimitiveKind,
    PrimitiveSpec, RemediationOp, RemediationRequest,
};
use studio_renderer::ViewportHandle;

use crate::state::{AppAction, ChatRole, JobOutput};

use super::ActionContext;

/// Chat prefix that asks the shape backend for a new object
const GENERATE_PREFIX: &str = "generate ";

/// Where a chat command goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandRoute {
    Undo,
    Redo,
    /// Prompt for the shape backend
    Generate(String),
    /// Text for the command parser
    Parse(String),
}

/// Decide how to handle a chat command
pub(crate) fn route_command(text: &str, can_generate: bool) -> Option<CommandRoute> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    let route = match lower.as_str() {
        "undo" => CommandRoute::Undo,
        "redo" => CommandRoute::Redo,
        _ if can_generate && lower.starts_with(GENERATE_PREFIX) => {
            let prompt = text[GENERATE_PREFIX.len()..].trim();
            if prompt.is_empty() {
                CommandRoute::Parse(text.to_string())
            } else {
                CommandRoute::Generate(prompt.to_string())
            }
        }
        _ => CommandRoute::Parse(text.to_string()),
    };
    Some(route)
}

/// Handle scene-related actions
pub fn handle_scene_action(action: AppAction, ctx: &ActionContext) {
    match action {
        AppAction::AddPrimitive(kind) => {
            let modification =
                Modification::new(ModificationKind::AddPrimitive(PrimitiveSpec::new(kind)));
            apply(modification, ctx);
        }
        AppAction::Apply(modification) => {
            apply(modification, ctx);
        }
        AppAction::SubmitCommand(text) => handle_command(&text, ctx),
        AppAction::Undo => {
            if let Some(viewport_state) = ctx.viewport()
                && !viewport_state.lock().viewport.undo()
            {
                tracing::debug!("Nothing to undo");
            }
        }
        AppAction::Redo => {
            if let Some(viewport_state) = ctx.viewport()
                && !viewport_state.lock().viewport.redo()
            {
                tracing::debug!("Nothing to redo");
            }
        }
        AppAction::UpdateMaterial(patch) => handle_update_material(&patch, ctx),
        AppAction::Remediate {
            id,
            operation,
            strength,
        } => handle_remediate(id, operation, strength, ctx),
        AppAction::GenerateShape(prompt) => handle_generate(prompt, ctx),
        AppAction::ZoomToSelection => {
            if let Some(viewport_state) = ctx.viewport()
                && !viewport_state.lock().viewport.zoom_to_selection()
            {
                ctx.app_state.lock().error("Select an object first");
            }
        }
        AppAction::ZoomToFit => {
            if let Some(viewport_state) = ctx.viewport() {
                viewport_state.lock().viewport.zoom_to_fit();
            }
        }
        _ => {}
    }
}

fn apply(modification: Modification, ctx: &ActionContext) -> Option<Modification> {
    let viewport_state = ctx.viewport()?;
    let applied = viewport_state
        .lock()
        .viewport
        .apply_modification(modification);
    tracing::debug!("Applied {}: {}", applied.type_name(), applied.description);
    Some(applied)
}

fn handle_command(text: &str, ctx: &ActionContext) {
    let Some(route) = route_command(text, ctx.services.shape.is_some()) else {
        return;
    };
    ctx.app_state.lock().push_chat(ChatRole::User, text.trim());

    let reply = match route {
        CommandRoute::Undo => match step_history(ctx, true) {
            Some(true) => "Undone".to_string(),
            Some(false) => "Nothing to undo".to_string(),
            None => return,
        },
        CommandRoute::Redo => match step_history(ctx, false) {
            Some(true) => "Redone".to_string(),
            Some(false) => "Nothing to redo".to_string(),
            None => return,
        },
        CommandRoute::Generate(prompt) => {
            let reply = format!("Generating \"{}\"...", prompt);
            handle_generate(prompt, ctx);
            reply
        }
        CommandRoute::Parse(text) => {
            let parsed = ctx
                .viewport()
                .and_then(|vp| vp.lock().viewport.parse_command(&text));
            match parsed {
                Some(modification) => match apply(modification, ctx) {
                    Some(applied) => applied.description,
                    None => return,
                },
                None => {
                    ctx.app_state
                        .lock()
                        .error(format!("Unrecognized command: {}", text));
                    "Sorry, I don't know how to do that yet".to_string()
                }
            }
        }
    };
    ctx.app_state.lock().push_chat(ChatRole::System, reply);
}

/// Undo or redo; `None` when there is no viewport
fn step_history(ctx: &ActionContext, undo: bool) -> Option<bool> {
    let viewport_state = ctx.viewport()?;
    let mut vp = viewport_state.lock();
    Some(if undo {
        vp.viewport.undo()
    } else {
        vp.viewport.redo()
    })
}

fn handle_update_material(patch: &MaterialPatch, ctx: &ActionContext) {
    if patch.is_empty() {
        return;
    }
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let result = viewport_state
        .lock()
        .viewport
        .apply_material_to_selection(patch);
    match result {
        Ok(count) => tracing::debug!("Updated material of {} objects", count),
        Err(e) => ctx.app_state.lock().error(e.to_string()),
    }
}

fn handle_remediate(id: ObjectId, operation: RemediationOp, strength: f32, ctx: &ActionContext) {
    let Some(service) = ctx.services.remediation.clone() else {
        ctx.app_state
            .lock()
            .error("No remediation service is configured");
        return;
    };
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };

    let mut vp = viewport_state.lock();
    let mesh = vp.viewport.editor().store().get(&id).map(|object| {
        match object.shape.mesh() {
            Some(mesh) => MeshSource::clone(mesh),
            None => {
                let geometry = object.geometry();
                MeshSource::from_indexed(geometry.positions, &geometry.indices)
            }
        }
    });
    let Some(mesh) = mesh else {
        drop(vp);
        ctx.app_state
            .lock()
            .error(format!("Object not found: {}", id));
        return;
    };
    let token = vp.viewport.begin_load(&format!("remediate:{}", id));
    drop(vp);

    let request = RemediationRequest {
        object_id: id,
        operation,
        strength: strength.clamp(0.0, 1.0),
        mesh,
    };
    {
        let mut app = ctx.app_state.lock();
        app.jobs_in_flight += 1;
        app.info(format!(
            "{} requested for {}",
            operation.label(),
            request.object_id
        ));
    }
    ctx.jobs.spawn(move || JobOutput::Remediated {
        token,
        result: service.remediate(&request),
    });
}

fn handle_generate(prompt: String, ctx: &ActionContext) {
    let Some(service) = ctx.services.shape.clone() else {
        ctx.app_state
            .lock()
            .error("No shape generation service is configured");
        return;
    };
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let token = viewport_state
        .lock()
        .viewport
        .begin_load(&format!("generate:{}", prompt));

    ctx.app_state.lock().jobs_in_flight += 1;
    ctx.jobs.spawn(move || {
        let result = service.generate(&prompt);
        JobOutput::ShapeGenerated {
            token,
            prompt,
            result,
        }
    });
}

/// Modification that adds a generated or imported mesh as a new object
pub(crate) fn add_mesh_modification(
    kind: PrimitiveKind,
    prompt: Option<String>,
    mesh: MeshSource,
) -> Modification {
    let mut spec = PrimitiveSpec::new(kind).with_mesh(mesh);
    spec.prompt = prompt;
    Modification::new(ModificationKind::AddPrimitive(spec))
}

#[cfg(test)]
mod tests {
    use studio_core::{SceneObject, Shape};

    use super::*;

    #[test]
    fn test_undo_redo_are_routed_directly() {
        assert_eq!(route_command(" Undo ", false), Some(CommandRoute::Undo));
        assert_eq!(route_command("redo", true), Some(CommandRoute::Redo));
        assert_eq!(route_command("   ", true), None);
    }

    #[test]
    fn test_generate_requires_service() {
        assert_eq!(
            route_command("generate a Chair", true),
            Some(CommandRoute::Generate("a Chair".into()))
        );
        assert_eq!(
            route_command("generate a chair", false),
            Some(CommandRoute::Parse("generate a chair".into()))
        );
        assert_eq!(
            route_command("generate ", true),
            Some(CommandRoute::Parse("generate".into()))
        );
    }

    #[test]
    fn test_other_text_goes_to_parser() {
        assert_eq!(
            route_command("rotate 90 degrees around z", true),
            Some(CommandRoute::Parse("rotate 90 degrees around z".into()))
        );
    }

    #[test]
    fn test_generated_mesh_becomes_ai_shape() {
        let mesh = MeshSource::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![[0, 1, 2]]);
        let modification = add_mesh_modification(
            PrimitiveKind::Other("ai_chair".into()),
            Some("a chair".into()),
            mesh,
        );
        let ModificationKind::AddPrimitive(spec) = &modification.kind else {
            panic!("expected add_primitive");
        };
        let object = SceneObject::new(Shape::from_spec(spec));
        assert_eq!(object.shape.type_tag(), "ai_chair");
        assert!(matches!(
            &object.shape,
            Shape::Ai { prompt: Some(p), mesh: Some(_), .. } if p == "a chair"
        ));
    }
}
