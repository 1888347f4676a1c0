//! Completion of background jobs

use std::sync::Arc;

use studio_core::{PrimitiveKind, SceneObject, Shape};
use studio_renderer::ViewportHandle;

use crate::state::{ChatRole, JobOutput};

use super::ActionContext;
use super::scene::add_mesh_modification;

/// Install the result of a finished job
///
/// Results whose load was superseded or cancelled (including by unmounting
/// the viewport) are dropped without touching the scene.
pub fn handle_job_output(output: JobOutput, ctx: &ActionContext) {
    {
        let mut app = ctx.app_state.lock();
        app.jobs_in_flight = app.jobs_in_flight.saturating_sub(1);
    }
    let Some(viewport_state) = ctx.viewport_state else {
        return;
    };
    let mut vp = viewport_state.lock();

    match output {
        JobOutput::MeshImported {
            token,
            name,
            result,
        } => match result {
            Ok(mesh) => {
                if !vp.viewport.accept_load(&token) {
                    return;
                }
                let stats = mesh.stats();
                let modification =
                    add_mesh_modification(PrimitiveKind::Other(name.clone()), None, mesh);
                vp.viewport.apply_modification(modification);
                drop(vp);
                ctx.app_state.lock().info(format!(
                    "Imported {} ({} vertices, {} faces)",
                    name, stats.vertex_count, stats.face_count
                ));
            }
            Err(e) => {
                let accepted = vp.viewport.accept_load(&token);
                drop(vp);
                if accepted {
                    ctx.app_state
                        .lock()
                        .error(format!("Failed to import {}: {}", name, e));
                }
            }
        },

        JobOutput::BaseModelLoaded {
            token,
            name,
            result,
        } => match result {
            Ok(mesh) => {
                let object = SceneObject::new(Shape::Mesh {
                    source: Some(name.clone()),
                    mesh: Some(Arc::new(mesh)),
                })
                .with_name(name.as_str());
                let installed = vp.viewport.finish_load(&token, object);
                drop(vp);
                if installed.is_some() {
                    ctx.app_state
                        .lock()
                        .info(format!("Loaded base model {}", name));
                }
            }
            Err(e) => {
                let accepted = vp.viewport.accept_load(&token);
                drop(vp);
                if accepted {
                    ctx.app_state
                        .lock()
                        .error(format!("Failed to load base model {}: {}", name, e));
                }
            }
        },

        JobOutput::ShapeGenerated {
            token,
            prompt,
            result,
        } => {
            if !vp.viewport.accept_load(&token) {
                return;
            }
            match result {
                Ok(shape) => {
                    let kind = PrimitiveKind::Other(format!("ai_{}", shape.kind));
                    let prompt = shape.prompt.or(Some(prompt));
                    let modification = add_mesh_modification(kind, prompt, shape.mesh);
                    let applied = vp.viewport.apply_modification(modification);
                    drop(vp);
                    ctx.app_state
                        .lock()
                        .push_chat(ChatRole::System, applied.description);
                }
                Err(e) => {
                    drop(vp);
                    let mut app = ctx.app_state.lock();
                    app.push_chat(ChatRole::System, format!("Generation failed: {}", e));
                    app.error(format!("Shape generation failed: {}", e));
                }
            }
        }

        JobOutput::Remediated { token, result } => {
            if !vp.viewport.accept_load(&token) {
                return;
            }
            let result = result
                .map_err(|e| e.to_string())
                .and_then(|r| vp.viewport.apply_remediation(r).map_err(|e| e.to_string()));
            drop(vp);
            match result {
                Ok(()) => ctx.app_state.lock().info("Remediation applied"),
                Err(e) => ctx
                    .app_state
                    .lock()
                    .error(format!("Remediation failed: {}", e)),
            }
        }
    }
}
