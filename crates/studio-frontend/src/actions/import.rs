//! Bytes-based mesh import (drag and drop, browser uploads)

use std::path::Path;

use studio_core::io::{ImportError, MeshFormat, import_bytes};

use crate::state::JobOutput;

use super::ActionContext;

/// Decode an uploaded mesh in the background and add it to the scene
pub fn handle_import_bytes(name: String, data: Vec<u8>, ctx: &ActionContext) {
    let Some(viewport_state) = ctx.viewport() else {
        return;
    };
    let path = Path::new(&name);
    let display_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh")
        .to_string();
    let format = MeshFormat::from_path(path);
    let token = viewport_state
        .lock()
        .viewport
        .begin_load(&format!("import:{}", name));
    tracing::info!("Importing {} ({} bytes)", name, data.len());

    ctx.app_state.lock().jobs_in_flight += 1;
    ctx.jobs.spawn(move || {
        let result = match format {
            Some(format) => import_bytes(&data, format),
            None => Err(ImportError::UnsupportedFormat(name)),
        };
        JobOutput::MeshImported {
            token,
            name: display_name,
            result,
        }
    });
}
