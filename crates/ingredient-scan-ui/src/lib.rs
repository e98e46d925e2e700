#![warn(missing_docs)]
//! # ingredient-scan-ui
//!
//! ## Purpose
//! Defines the rendering boundary of `ingredient-scan`: the events the
//! request coordinator emits and a reference state model that consumes them.
//!
//! ## Responsibilities
//! - Declare [`RenderSink`], the one-directional render interface.
//! - Represent structured, user-facing errors as [`UiError`].
//! - Reduce loading/report/error events into [`RenderState`].
//!
//! ## Data flow
//! Coordinator -> [`RenderSink`] events -> [`RenderState`] -> shell output.
//!
//! ## Ownership and lifetimes
//! `RenderState` owns every report and message it shows, so a snapshot can be
//! cloned out from behind the [`SharedRenderState`] lock.
//!
//! ## Error model
//! Errors arrive as values inside [`RenderOutcome::Failed`] or
//! [`RenderSink::prompt`]; nothing in this crate returns `Result`.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use ingredient_scan_core::Generation;
use ingredient_scan_report::DisplayReport;
use serde::{Deserialize, Serialize};

/// Kind of user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiErrorKind {
    /// Input rejected locally (for example no file selected).
    Validation,
    /// Network failure or non-success status.
    Transport,
    /// Classifier reply violated the contract.
    MalformedResponse,
}

/// Structured error handed to the rendering boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiError {
    /// Failure kind.
    pub kind: UiErrorKind,
    /// Message safe to show to the user.
    pub message: String,
}

impl UiError {
    /// Creates a UI error.
    pub fn new(kind: UiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Tagged result of one resolved generation.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    /// Analysis succeeded.
    Report(Box<DisplayReport>),
    /// Analysis failed; no partial report exists.
    Failed(UiError),
}

/// One-directional render interface fed by the request coordinator.
pub trait RenderSink: Send + Sync {
    /// Loading indicator change for one generation.
    fn loading_changed(&self, generation: Generation, loading: bool);

    /// Final outcome of the latest generation.
    fn deliver(&self, generation: Generation, outcome: RenderOutcome);

    /// Local validation prompt; no generation was issued.
    fn prompt(&self, error: UiError);
}

/// Reference render state reduced from [`RenderSink`] events.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    /// App version shown in the shell.
    pub version: String,
    /// Whether the latest generation is still in flight.
    pub loading: bool,
    /// Latest generation announced through a loading event.
    pub latest_generation: Option<Generation>,
    /// Generation whose outcome is on screen.
    pub rendered_generation: Option<Generation>,
    /// Report on screen.
    pub report: Option<DisplayReport>,
    /// Error on screen.
    pub error: Option<UiError>,
    /// Pending validation prompt.
    pub prompt: Option<UiError>,
    /// One-line status text.
    pub status_text: String,
}

impl RenderState {
    /// Creates an empty render state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            loading: false,
            latest_generation: None,
            rendered_generation: None,
            report: None,
            error: None,
            prompt: None,
            status_text: "No analysis yet".to_string(),
        }
    }

    /// Applies a loading event.
    ///
    /// Clearing is honoured only for the latest generation; an older
    /// generation finishing never hides the spinner of a newer one.
    pub fn apply_loading(&mut self, generation: Generation, loading: bool) {
        if loading {
            if self.latest_generation.is_none_or(|latest| generation >= latest) {
                self.latest_generation = Some(generation);
                self.loading = true;
                self.prompt = None;
                self.status_text = "Analyzing...".to_string();
            }
            return;
        }

        if self.latest_generation == Some(generation) {
            self.loading = false;
        }
    }

    /// Applies a delivered outcome, replacing any previous report or error.
    pub fn apply_outcome(&mut self, generation: Generation, outcome: RenderOutcome) {
        if self.latest_generation.is_some_and(|latest| generation < latest) {
            return;
        }

        self.rendered_generation = Some(generation);
        match outcome {
            RenderOutcome::Report(report) => {
                self.status_text = format!(
                    "{} {}: {:.1}% safe ({} of {} flagged)",
                    report.tier_icon,
                    report.tier.label(),
                    report.safety_score_display,
                    report.harmful_count,
                    report.total_count
                );
                self.report = Some(*report);
                self.error = None;
            }
            RenderOutcome::Failed(error) => {
                self.status_text = error.message.clone();
                self.report = None;
                self.error = Some(error);
            }
        }
    }

    /// Applies a validation prompt. The current report stays on screen.
    pub fn apply_prompt(&mut self, error: UiError) {
        self.prompt = Some(error);
    }
}

/// Thread-safe [`RenderState`] usable as a [`RenderSink`].
#[derive(Debug)]
pub struct SharedRenderState {
    inner: Mutex<RenderState>,
}

impl SharedRenderState {
    /// Wraps a fresh render state.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(RenderState::new(version)),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> RenderState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn with_state(&self, f: impl FnOnce(&mut RenderState)) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

impl RenderSink for SharedRenderState {
    fn loading_changed(&self, generation: Generation, loading: bool) {
        self.with_state(|state| state.apply_loading(generation, loading));
    }

    fn deliver(&self, generation: Generation, outcome: RenderOutcome) {
        self.with_state(|state| state.apply_outcome(generation, outcome));
    }

    fn prompt(&self, error: UiError) {
        self.with_state(|state| state.apply_prompt(error));
    }
}
