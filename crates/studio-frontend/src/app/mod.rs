//! Main application module

mod dock;
mod menu;

use std::sync::Arc;

use egui_dock::{DockArea, DockState, Style};
use parking_lot::Mutex;
use studio_core::{Modification, ModificationKind};
use web_time::{Duration, Instant};

use crate::actions::{ActionContext, dispatch_action, handle_job_output};
use crate::config::{ConfigManager, SharedConfig};
use crate::services::Services;
use crate::state::{
    AppAction, JobQueue, NoticeLevel, SharedAppState, SharedViewportState, ViewportState,
    create_shared_state,
};

pub use dock::{PanelType, StudioTabViewer, create_dock_layout};
pub use menu::{MenuAction, render_menu_bar};

/// Poll interval while background jobs are running
const JOB_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Main application
pub struct StudioApp {
    dock_state: DockState<PanelType>,
    app_state: SharedAppState,
    viewport_state: Option<SharedViewportState>,
    config: SharedConfig,
    services: Services,
    jobs: JobQueue,
}

impl StudioApp {
    /// Create a new app
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = ConfigManager::load_default().into_shared();
        let (renderer_config, service_config) = {
            let config = config.lock();
            (
                config.config().renderer.clone(),
                config.config().services.clone(),
            )
        };
        let services = Services::from_config(&service_config);

        // Create viewport state if WGPU is available
        let viewport_state = cc.wgpu_render_state.as_ref().map(|render_state| {
            let device = render_state.device.clone();
            let queue = render_state.queue.clone();
            let format = render_state.target_format;

            let mut state = ViewportState::new(device, queue, format, renderer_config);
            if let Some(sink) = &services.sink {
                state.viewport.set_sink(sink.clone());
            }
            Arc::new(Mutex::new(state))
        });
        if viewport_state.is_none() {
            tracing::warn!("WGPU render state unavailable; 3D viewport disabled");
        }

        Self {
            dock_state: create_dock_layout(),
            app_state: create_shared_state(),
            viewport_state,
            config,
            services,
            jobs: JobQueue::new(),
        }
    }

    /// Process pending actions
    fn process_actions(&mut self) {
        let actions = self.app_state.lock().take_pending_actions();
        let ctx = ActionContext::new(
            &self.app_state,
            &self.viewport_state,
            &self.jobs,
            &self.services,
        );

        for action in actions {
            dispatch_action(action, &ctx);
        }
    }

    /// Install results of finished background jobs
    fn process_jobs(&mut self) {
        let outputs = self.jobs.drain();
        if outputs.is_empty() {
            return;
        }
        let ctx = ActionContext::new(
            &self.app_state,
            &self.viewport_state,
            &self.jobs,
            &self.services,
        );
        for output in outputs {
            handle_job_output(output, &ctx);
        }
    }

    /// Keyboard shortcuts and dropped files
    fn handle_input(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        if !ctx.wants_keyboard_input() {
            ctx.input_mut(|i| {
                let redo = egui::KeyboardShortcut::new(
                    egui::Modifiers::COMMAND | egui::Modifiers::SHIFT,
                    egui::Key::Z,
                );
                let undo = egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Z);
                if i.consume_shortcut(&redo)
                    || i.consume_key(egui::Modifiers::COMMAND, egui::Key::Y)
                {
                    actions.push(AppAction::Redo);
                } else if i.consume_shortcut(&undo) {
                    actions.push(AppAction::Undo);
                }
                if i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace) {
                    actions.push(AppAction::Apply(Modification::new(ModificationKind::Delete)));
                }
                if i.key_pressed(egui::Key::F) {
                    actions.push(AppAction::ZoomToSelection);
                }
                if i.key_pressed(egui::Key::Home) {
                    actions.push(AppAction::ZoomToFit);
                }
            });
        }

        ctx.input(|i| {
            for file in &i.raw.dropped_files {
                #[cfg(not(target_arch = "wasm32"))]
                {
                    if let Some(path) = &file.path {
                        actions.push(AppAction::ImportMesh(path.clone()));
                        continue;
                    }
                }
                if let Some(bytes) = &file.bytes {
                    actions.push(AppAction::ImportMeshBytes {
                        name: file.name.clone(),
                        data: bytes.to_vec(),
                    });
                }
            }
        });

        if !actions.is_empty() {
            let mut state = self.app_state.lock();
            for action in actions {
                state.queue_action(action);
            }
        }
    }

    /// Status bar with the latest notice and running jobs
    fn show_status_bar(&self, ctx: &egui::Context) {
        let state = self.app_state.lock();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(notice) = state.visible_notice(Instant::now()) {
                    match notice.level {
                        NoticeLevel::Info => {
                            ui.label(&notice.text);
                        }
                        NoticeLevel::Error => {
                            ui.colored_label(ui.visuals().error_fg_color, &notice.text);
                        }
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if state.jobs_in_flight > 0 {
                        ui.spinner();
                        ui.weak(format!("{} running", state.jobs_in_flight));
                    }
                });
            });
        });
    }

    /// Persist renderer settings changed from the UI
    fn sync_config(&self) {
        let Some(viewport_state) = &self.viewport_state else {
            return;
        };
        let renderer = viewport_state.lock().viewport.config().clone();
        let mut config = self.config.lock();
        if config.config().renderer == renderer {
            return;
        }
        config.config_mut().renderer = renderer;
        if let Err(e) = config.save() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    fn needs_repaint(&self) -> bool {
        let jobs_running = self.app_state.lock().jobs_in_flight > 0;
        let autofit_pending = self
            .viewport_state
            .as_ref()
            .is_some_and(|vp| vp.lock().viewport.autofit_pending());
        jobs_running || autofit_pending
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        // Process pending actions, then finished background work
        self.process_actions();
        self.process_jobs();

        // Menu bar
        if let Some(menu_action) = render_menu_bar(ctx, &self.app_state) {
            match menu_action {
                MenuAction::ResetLayout => {
                    self.dock_state = create_dock_layout();
                }
            }
        }

        self.show_status_bar(ctx);

        // Dock area
        let render_state = frame.wgpu_render_state();

        DockArea::new(&mut self.dock_state)
            .style(Style::from_egui(ctx.style().as_ref()))
            .show(
                ctx,
                &mut StudioTabViewer {
                    app_state: &self.app_state,
                    render_state,
                    viewport_state: &self.viewport_state,
                },
            );

        self.sync_config();

        if self.needs_repaint() {
            ctx.request_repaint_after(JOB_POLL_INTERVAL);
        }
    }
}
