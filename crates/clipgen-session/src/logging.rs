//! Structured session logging.

use clipgen_models::{FailureKind, ProcessingStep};
use tracing::{error, info, warn, Span};

/// Logger for one operation of a session.
///
/// Every line carries `session_id` and `operation`, plus `run` when the
/// operation belongs to a processing run.
#[derive(Debug, Clone)]
pub struct SessionLogger {
    session_id: String,
    operation: &'static str,
    run: Option<u64>,
}

impl SessionLogger {
    /// Create a logger for one operation of a session.
    ///
    /// # Arguments
    /// * `session_id` - The session's unique identifier
    /// * `operation` - The operation being logged (e.g. "strategy_request")
    pub fn new(session_id: &str, operation: &'static str) -> Self {
        Self {
            session_id: session_id.to_string(),
            operation,
            run: None,
        }
    }

    /// Tag lines with the processing run (session generation).
    pub fn for_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Session this logger belongs to.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Operation name attached to every line.
    pub fn operation(&self) -> &str {
        self.operation
    }

    /// Processing run, if tagged with [`SessionLogger::for_run`].
    pub fn run(&self) -> Option<u64> {
        self.run
    }

    /// Log the start of the operation.
    pub fn log_start(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run,
            "Started: {}", message
        );
    }

    /// Log a progress milestone being passed.
    ///
    /// # Arguments
    /// * `step` - The milestone that was just reached
    /// * `progress` - Progress value that reached it
    pub fn log_progress(&self, step: ProcessingStep, progress: u8) {
        info!(
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run,
            progress,
            "{}", step.label()
        );
    }

    /// Log a warning, e.g. a discarded stale outcome.
    pub fn log_warning(&self, message: &str) {
        warn!(
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run,
            "{}", message
        );
    }

    /// Log a failed run.
    ///
    /// The kind is logged here and never shown to the user.
    ///
    /// # Arguments
    /// * `kind` - Failure classification
    /// * `message` - Underlying error text
    pub fn log_error(&self, kind: FailureKind, message: &str) {
        error!(
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run,
            kind = kind.as_str(),
            "Failed: {}", message
        );
    }

    /// Log the successful completion of the operation.
    pub fn log_completion(&self, message: &str) {
        info!(
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run,
            "Completed: {}", message
        );
    }

    /// Create a tracing span carrying this logger's fields.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "session",
            session_id = %self.session_id,
            operation = self.operation,
            run = self.run
        )
    }
}
