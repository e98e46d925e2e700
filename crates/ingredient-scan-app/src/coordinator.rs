//! Generation-numbered request coordination.
//!
//! Every accepted submission receives a [`Generation`] before the classifier
//! is called. When a reply arrives, only the latest generation is delivered
//! to the [`RenderSink`]; older replies are dropped without a user-visible
//! signal. The generation check and the delivery happen under one lock, so a
//! stale result can never land after a newer one.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ingredient_scan_core::{AnalysisResult, Generation};
use ingredient_scan_report::derive_report;
use ingredient_scan_ui::{RenderOutcome, RenderSink, UiError, UiErrorKind};
use ingredient_scan_upload::{
    ClassifierClient, FailureClass, ImageUpload, UploadError, classify_upload_error,
    image_fingerprint,
};

use crate::ValidationError;

/// Lifecycle phase of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing submitted, or reset after a terminal phase.
    Idle,
    /// Latest generation is in flight.
    Submitting,
    /// Latest generation rendered a report.
    Succeeded,
    /// Latest generation rendered an error.
    Failed,
}

/// Proof that one generation was issued. Resolving consumes it, so each
/// generation clears its loading signal exactly once.
#[derive(Debug)]
#[must_use = "an unresolved ticket leaves its generation loading"]
pub struct SubmissionTicket {
    generation: Generation,
}

impl SubmissionTicket {
    /// Generation carried by this ticket.
    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// How one submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Latest generation; report delivered.
    Rendered(Generation),
    /// Latest generation; error delivered.
    Failed(Generation),
    /// Superseded generation; nothing delivered.
    Stale(Generation),
    /// Rejected locally; no generation issued.
    Rejected,
}

#[derive(Debug)]
struct CoordinatorState {
    latest: Option<Generation>,
    phase: Phase,
}

/// Owns the submit -> fetch -> render lifecycle.
///
/// Sink callbacks run while the coordinator lock is held; a sink must not
/// call back into the coordinator.
pub struct RequestCoordinator {
    state: Mutex<CoordinatorState>,
    sink: Arc<dyn RenderSink>,
}

impl RequestCoordinator {
    /// Creates an idle coordinator rendering into `sink`.
    pub fn new(sink: Arc<dyn RenderSink>) -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                latest: None,
                phase: Phase::Idle,
            }),
            sink,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    /// Most recently issued generation.
    pub fn latest_generation(&self) -> Option<Generation> {
        self.lock().latest
    }

    /// Returns to [`Phase::Idle`]. Generation numbering continues.
    pub fn reset(&self) {
        self.lock().phase = Phase::Idle;
    }

    /// Validates the selection and issues the next generation.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when no usable file is selected. The sink
    /// receives a prompt and no generation is consumed.
    pub fn begin(&self, upload: Option<&ImageUpload>) -> Result<SubmissionTicket, ValidationError> {
        let upload = self.validate(upload)?;
        Ok(self.issue(upload))
    }

    /// Resolves one generation with the classifier outcome.
    pub fn resolve(
        &self,
        ticket: SubmissionTicket,
        outcome: Result<AnalysisResult, UploadError>,
    ) -> Resolution {
        let generation = ticket.generation;

        // Ranking and composition are pure, so they run outside the lock.
        let outcome = match outcome {
            Ok(result) => RenderOutcome::Report(Box::new(derive_report(&result))),
            Err(error) => RenderOutcome::Failed(ui_error_for(&error)),
        };

        let mut state = self.lock();
        let resolution = if state.latest != Some(generation) {
            tracing::debug!(
                stage = "coordinator",
                action = "discard_stale",
                generation = generation.0,
                latest = state.latest.map(|latest| latest.0),
                "superseded result discarded"
            );
            Resolution::Stale(generation)
        } else {
            match &outcome {
                RenderOutcome::Report(report) => {
                    state.phase = Phase::Succeeded;
                    tracing::info!(
                        stage = "coordinator",
                        action = "render_report",
                        generation = generation.0,
                        total = report.total_count,
                        harmful = report.harmful_count,
                        tier = report.tier.label(),
                        "report rendered"
                    );
                    self.sink.deliver(generation, outcome);
                    Resolution::Rendered(generation)
                }
                RenderOutcome::Failed(error) => {
                    state.phase = Phase::Failed;
                    tracing::warn!(
                        stage = "coordinator",
                        action = "render_error",
                        generation = generation.0,
                        kind = ?error.kind,
                        message = %error.message,
                        "analysis failed"
                    );
                    self.sink.deliver(generation, outcome);
                    Resolution::Failed(generation)
                }
            }
        };

        self.sink.loading_changed(generation, false);
        drop(state);
        resolution
    }

    /// Runs one full submission against `client`, blocking on the call.
    ///
    /// Safe to call from several threads at once; only the most recently
    /// issued generation is rendered.
    pub fn submit(&self, client: &ClassifierClient, upload: Option<&ImageUpload>) -> Resolution {
        let Ok(upload) = self.validate(upload) else {
            return Resolution::Rejected;
        };
        let ticket = self.issue(upload);
        let outcome = client.analyze(upload);
        self.resolve(ticket, outcome)
    }

    fn validate<'a>(
        &self,
        upload: Option<&'a ImageUpload>,
    ) -> Result<&'a ImageUpload, ValidationError> {
        let result = match upload {
            None => Err(ValidationError::NoFileSelected),
            Some(upload) if upload.is_empty() => Err(ValidationError::EmptyImage),
            Some(upload) => Ok(upload),
        };

        if let Err(error) = &result {
            tracing::info!(
                stage = "coordinator",
                action = "reject_submission",
                reason = %error,
                "submission rejected before upload"
            );
            self.sink
                .prompt(UiError::new(UiErrorKind::Validation, error.to_string()));
        }
        result
    }

    fn issue(&self, upload: &ImageUpload) -> SubmissionTicket {
        let mut state = self.lock();
        let generation = state.latest.map_or(Generation(1), Generation::next);
        state.latest = Some(generation);
        state.phase = Phase::Submitting;

        tracing::info!(
            stage = "coordinator",
            action = "submit",
            generation = generation.0,
            fingerprint = %image_fingerprint(upload),
            bytes = upload.len(),
            "analysis submitted"
        );
        self.sink.loading_changed(generation, true);

        SubmissionTicket { generation }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Maps a classifier failure to the structured error shown to the user.
pub fn ui_error_for(error: &UploadError) -> UiError {
    match classify_upload_error(error) {
        FailureClass::Local => UiError::new(UiErrorKind::Validation, error.to_string()),
        FailureClass::Transport => {
            let message = match error {
                UploadError::Status { message, .. } => message.clone(),
                other => format!("Could not reach the ingredient analyzer: {other}"),
            };
            UiError::new(UiErrorKind::Transport, message)
        }
        FailureClass::MalformedResponse => UiError::new(
            UiErrorKind::MalformedResponse,
            "The ingredient analyzer returned an unexpected response",
        ),
    }
}
