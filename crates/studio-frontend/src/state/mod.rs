//! Application state module

mod jobs;
mod viewport;

pub use jobs::{JobOutput, JobQueue};
pub use viewport::{SharedViewportState, ViewportState};

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use studio_core::{MaterialPatch, Modification, ObjectId, PrimitiveKind, RemediationOp};
use studio_renderer::ExportFormat;
use web_time::Instant;

/// Maximum number of chat lines kept
const CHAT_LOG_CAPACITY: usize = 200;

/// How long a notice stays in the status bar
const NOTICE_SECONDS: f32 = 6.0;

/// Actions that can be performed on the app state
#[derive(Debug, Clone)]
pub enum AppAction {
    // File actions (path-based, native only)
    /// Add a mesh file to the scene
    ImportMesh(PathBuf),
    /// Replace the base model with a mesh file
    LoadBaseModel(PathBuf),
    /// Write the whole scene as binary STL
    ExportScene(PathBuf),
    /// Write the selection as binary STL
    ExportSelection(PathBuf),
    /// Write one object
    ExportObject {
        id: ObjectId,
        format: ExportFormat,
        path: PathBuf,
    },
    /// Save a PNG screenshot
    SaveScreenshot(PathBuf),

    // File actions (bytes-based, for WASM)
    /// Add an uploaded mesh to the scene
    ImportMeshBytes { name: String, data: Vec<u8> },

    // Scene actions
    /// Add a primitive at the origin
    AddPrimitive(PrimitiveKind),
    /// Apply a modification through the viewport handle
    Apply(Modification),
    /// Free-text command from the chat panel
    SubmitCommand(String),
    /// Step back in history
    Undo,
    /// Step forward in history
    Redo,
    /// Patch the material of the selection
    UpdateMaterial(MaterialPatch),
    /// Ask the remediation backend to rework an object
    Remediate {
        id: ObjectId,
        operation: RemediationOp,
        strength: f32,
    },
    /// Ask the shape backend for a new object
    GenerateShape(String),
    /// Frame the selection
    ZoomToSelection,
    /// Frame the whole scene
    ZoomToFit,
}

/// Severity of a status bar notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient status bar message
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub created: Instant,
}

impl Notice {
    /// Whether the notice should still be shown
    pub fn is_visible(&self, now: Instant) -> bool {
        now.duration_since(self.created).as_secs_f32() < NOTICE_SECONDS
    }
}

/// Who wrote a chat line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    System,
}

/// One line in the command panel
#[derive(Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub role: ChatRole,
    pub text: String,
}

/// Application state
#[derive(Debug)]
pub struct AppState {
    /// Pending actions
    pending_actions: Vec<AppAction>,
    /// Latest status bar notice
    notice: Option<Notice>,
    /// Command panel history
    chat: Vec<ChatLine>,
    /// Remediation operation chosen in the properties panel
    pub remediation_op: RemediationOp,
    /// Remediation strength chosen in the properties panel
    pub remediation_strength: f32,
    /// Number of background jobs in flight
    pub jobs_in_flight: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            pending_actions: Vec::new(),
            notice: None,
            chat: Vec::new(),
            remediation_op: RemediationOp::Decimate,
            remediation_strength: 0.5,
            jobs_in_flight: 0,
        }
    }
}

impl AppState {
    /// Create a new app state
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an action for processing at the start of the next frame
    pub fn queue_action(&mut self, action: AppAction) {
        self.pending_actions.push(action);
    }

    /// Take all pending actions
    pub fn take_pending_actions(&mut self) -> Vec<AppAction> {
        std::mem::take(&mut self.pending_actions)
    }

    /// Show an informational notice
    pub fn info(&mut self, text: impl Into<String>) {
        self.set_notice(NoticeLevel::Info, text.into());
    }

    /// Show an error notice
    pub fn error(&mut self, text: impl Into<String>) {
        self.set_notice(NoticeLevel::Error, text.into());
    }

    fn set_notice(&mut self, level: NoticeLevel, text: String) {
        match level {
            NoticeLevel::Info => tracing::info!("{}", text),
            NoticeLevel::Error => tracing::warn!("{}", text),
        }
        self.notice = Some(Notice {
            level,
            text,
            created: Instant::now(),
        });
    }

    /// Notice to show at `now`, if any
    pub fn visible_notice(&self, now: Instant) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| n.is_visible(now))
    }

    /// Append a chat line, dropping the oldest past capacity
    pub fn push_chat(&mut self, role: ChatRole, text: impl Into<String>) {
        self.chat.push(ChatLine {
            role,
            text: text.into(),
        });
        if self.chat.len() > CHAT_LOG_CAPACITY {
            let excess = self.chat.len() - CHAT_LOG_CAPACITY;
            self.chat.drain(..excess);
        }
    }

    /// Command panel history
    pub fn chat(&self) -> &[ChatLine] {
        &self.chat
    }
}

/// Shared app state
pub type SharedAppState = Arc<Mutex<AppState>>;

/// Create a new shared app state
pub fn create_shared_state() -> SharedAppState {
    Arc::new(Mutex::new(AppState::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_drain_in_order() {
        let mut state = AppState::new();
        state.queue_action(AppAction::Undo);
        state.queue_action(AppAction::ZoomToFit);
        let actions = state.take_pending_actions();
        assert!(matches!(actions[..], [AppAction::Undo, AppAction::ZoomToFit]));
        assert!(state.take_pending_actions().is_empty());
    }

    #[test]
    fn test_chat_capacity() {
        let mut state = AppState::new();
        for i in 0..CHAT_LOG_CAPACITY + 5 {
            state.push_chat(ChatRole::User, format!("line {}", i));
        }
        assert_eq!(state.chat().len(), CHAT_LOG_CAPACITY);
        assert_eq!(state.chat()[0].text, "line 5");
    }

    #[test]
    fn test_notice_replaced() {
        let mut state = AppState::new();
        state.info("loaded");
        state.error("No object selected");
        let notice = state.visible_notice(Instant::now()).unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text, "No object selected");
    }
}
