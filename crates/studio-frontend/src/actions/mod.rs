//! Action handling module
//!
//! Actions are queued in AppState by panels and menus, then dispatched here
//! at the start of each frame. Work that can block (file decoding, backend
//! calls) is handed to the job queue; its results come back through
//! [`handle_job_output`].

#[cfg(not(target_arch = "wasm32"))]
mod file;
mod import;
mod jobs;
mod scene;

use crate::services::Services;
use crate::state::{AppAction, JobQueue, SharedAppState, SharedViewportState};

#[cfg(not(target_arch = "wasm32"))]
pub use file::handle_file_action;
pub use import::handle_import_bytes;
pub use jobs::handle_job_output;
pub use scene::handle_scene_action;

/// Context for action handlers
pub struct ActionContext<'a> {
    pub app_state: &'a SharedAppState,
    pub viewport_state: &'a Option<SharedViewportState>,
    pub jobs: &'a JobQueue,
    pub services: &'a Services,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        app_state: &'a SharedAppState,
        viewport_state: &'a Option<SharedViewportState>,
        jobs: &'a JobQueue,
        services: &'a Services,
    ) -> Self {
        Self {
            app_state,
            viewport_state,
            jobs,
            services,
        }
    }

    /// Viewport state, reporting an error notice when rendering is unavailable
    pub(crate) fn viewport(&self) -> Option<&'a SharedViewportState> {
        let viewport = self.viewport_state.as_ref();
        if viewport.is_none() {
            self.app_state
                .lock()
                .error("3D viewport is not available on this device");
        }
        viewport
    }
}

/// Dispatch an action to the appropriate handler
pub fn dispatch_action(action: AppAction, ctx: &ActionContext) {
    match action {
        // File actions (native only)
        #[cfg(not(target_arch = "wasm32"))]
        AppAction::ImportMesh(_)
        | AppAction::LoadBaseModel(_)
        | AppAction::ExportScene(_)
        | AppAction::ExportSelection(_)
        | AppAction::ExportObject { .. }
        | AppAction::SaveScreenshot(_) => {
            handle_file_action(action, ctx);
        }

        // File actions (WASM - ignore)
        #[cfg(target_arch = "wasm32")]
        AppAction::ImportMesh(_)
        | AppAction::LoadBaseModel(_)
        | AppAction::ExportScene(_)
        | AppAction::ExportSelection(_)
        | AppAction::ExportObject { .. }
        | AppAction::SaveScreenshot(_) => {
            tracing::warn!("File actions are not supported in WASM");
        }

        // Bytes-based import works on every platform
        AppAction::ImportMeshBytes { name, data } => {
            handle_import_bytes(name, data, ctx);
        }

        // Scene actions
        AppAction::AddPrimitive(_)
        | AppAction::Apply(_)
        | AppAction::SubmitCommand(_)
        | AppAction::Undo
        | AppAction::Redo
        | AppAction::UpdateMaterial(_)
        | AppAction::Remediate { .. }
        | AppAction::GenerateShape(_)
        | AppAction::ZoomToSelection
        | AppAction::ZoomToFit => {
            handle_scene_action(action, ctx);
        }
    }
}
