//! Session lifecycle
//!
//! A `Session` is created when the tool starts and dropped when it exits. It
//! owns the armed/idle state and the host snapshot, and is the only place
//! render results become notifications.
//!
//! ```text
//! Idle ──activate()──────────▶ Armed
//! Idle ──run() succeeds──────▶ Armed
//! Armed ── (no way back) ──
//! ```
//!
//! Saves are ignored while idle; an explicit `run()` always renders.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::RenderError;
use crate::host::{HostContext, has_extension};
use crate::notification::{Notification, Notifier};
use crate::pipeline::{Pipeline, RenderReport};

pub const ACTIVATED_MESSAGE: &str = "Extension activated.";
pub const SUCCESS_MESSAGE: &str = "File generated successfully.";

/// Whether save-triggered renders are active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Armed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Armed => write!(f, "armed"),
        }
    }
}

pub struct Session {
    state: SessionState,
    host: HostContext,
    pipeline: Pipeline,
    notifier: Arc<dyn Notifier>,
}

impl Session {
    /// A fresh, idle session
    pub fn new(pipeline: Pipeline, host: HostContext, notifier: Arc<dyn Notifier>) -> Self {
        debug!(?host, "Session::new: called");
        Self {
            state: SessionState::Idle,
            host,
            pipeline,
            notifier,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        self.state == SessionState::Armed
    }

    pub fn host(&self) -> &HostContext {
        &self.host
    }

    /// Change which document an explicit `run()` renders
    pub fn set_active_document(&mut self, document: impl AsRef<Path>) {
        self.host = self.host.with_active_document(self.host.resolve(document.as_ref()));
    }

    /// Arm save-triggered rendering
    pub fn activate(&mut self) {
        debug!(state = %self.state, "Session::activate: called");
        self.state = SessionState::Armed;
        self.notifier.notify(Notification::info(ACTIVATED_MESSAGE));
    }

    /// Explicit render command
    pub async fn run(&mut self) -> Result<RenderReport, RenderError> {
        debug!(state = %self.state, "Session::run: called");
        match self.pipeline.run(&self.host, self.notifier.as_ref()).await {
            Ok(report) => {
                if self.state == SessionState::Idle {
                    info!("First successful render, arming session");
                    self.state = SessionState::Armed;
                }
                self.notifier.notify(Notification::info(SUCCESS_MESSAGE));
                Ok(report)
            }
            Err(e) => {
                debug!(error = %e, "Session::run: render failed");
                self.notifier.notify(e.notification());
                Err(e)
            }
        }
    }

    /// Document-save handler
    ///
    /// Returns `None` when the save was ignored: not a template source, or the
    /// session is idle.
    pub async fn on_save(&mut self, path: &Path) -> Option<Result<RenderReport, RenderError>> {
        debug!(?path, state = %self.state, "Session::on_save: called");
        if !has_extension(path, self.pipeline.source_extension()) {
            debug!("Session::on_save: not a template source, ignoring");
            return None;
        }
        if !self.is_armed() {
            debug!("Session::on_save: idle, ignoring");
            return None;
        }
        self.set_active_document(path);
        Some(self.run().await)
    }
}
