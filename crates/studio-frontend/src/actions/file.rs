//! File I/O action handlers

use std::path::{Path, PathBuf};

use studio_core::ObjectId;
use studio_core::io::import_path;
use studio_renderer::capture::encode_png;
use studio_renderer::{ExportFormat, ViewportError, ViewportHandle};

use crate::state::{AppAction, JobOutput};

use super::ActionContext;

/// Load target used for base model replacement
pub(crate) const BASE_MODEL_TARGET: &str = "base_model";

/// Handle file-related actions
pub fn handle_file_action(action: AppAction, ctx: &ActionContext) {
    match action {
        AppAction::ImportMesh(path) => handle_import_mesh(path, ctx),
        AppAction::LoadBaseModel(path) => handle_load_base_model(path, ctx),
        AppAction::ExportScene(path) => handle_export_scene(&path, ctx),
        AppAction::ExportSelection(path) => handle_export_selection(&path, ctx),
        AppAction::ExportObject { id, format, path } => {
            handle_export_object(&id, format, &path, ctx)
        }
        AppAction::SaveScreenshot(path) => handle_save_screenshot(&path, ctx),
        _ => {}
    }
}

/// Display name for a file: its stem, or "mesh"
pub(crate) fn file_stem_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("mesh")
        .to_string()
}

fn handle_import_mesh(path: PathBuf, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let token = viewport_state
        .lock()
        .viewport
        .begin_load(&format!("import:{}", path.display()));
    let name = file_stem_name(&path);
    tracing::info!("Importing mesh from {:?}", path);

    ctx.app_state.lock().jobs_in_flight += 1;
    ctx.jobs.spawn(move || JobOutput::MeshImported {
        token,
        name,
        result: import_path(&path),
    });
}

fn handle_load_base_model(path: PathBuf, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    // A newer base model load supersedes any still in flight
    let token = viewport_state.lock().viewport.begin_load(BASE_MODEL_TARGET);
    let name = file_stem_name(&path);
    tracing::info!("Loading base model from {:?}", path);

    ctx.app_state.lock().jobs_in_flight += 1;
    ctx.jobs.spawn(move || JobOutput::BaseModelLoaded {
        token,
        name,
        result: import_path(&path),
    });
}

fn handle_export_scene(path: &Path, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let result = viewport_state.lock().viewport.export_stl();
    write_output(path, result, "scene", ctx);
}

fn handle_export_selection(path: &Path, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let result = viewport_state.lock().viewport.export_selection_stl();
    write_output(path, result, "selection", ctx);
}

fn handle_export_object(id: &ObjectId, format: ExportFormat, path: &Path, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let result = viewport_state.lock().viewport.export_to_format(id, format);
    write_output(path, result, "object", ctx);
}

fn handle_save_screenshot(path: &Path, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let result = viewport_state
        .lock()
        .viewport
        .capture()
        .map_err(ViewportError::from)
        .and_then(|image| encode_png(&image).map_err(ViewportError::from));
    write_output(path, result, "screenshot", ctx);
}

fn write_output(
    path: &Path,
    result: Result<Vec<u8>, ViewportError>,
    what: &str,
    ctx: &ActionContext,
) {
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            ctx.app_state
                .lock()
                .error(format!("Failed to export {}: {}", what, e));
            return;
        }
    };
    match std::fs::write(path, &bytes) {
        Ok(()) => {
            ctx.app_state.lock().info(format!(
                "Saved {} to {} ({} bytes)",
                what,
                path.display(),
                bytes.len()
            ));
        }
        Err(e) => {
            ctx.app_state
                .lock()
                .error(format!("Failed to write {}: {}", path.display(), e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_name() {
        assert_eq!(file_stem_name(Path::new("/tmp/parts/bracket.stl")), "bracket");
        assert_eq!(file_stem_name(Path::new("/")), "mesh");
    }
}
