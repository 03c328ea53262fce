//! Terminal progress view driven by session events.

use clipgen_models::{FailureKind, SessionEvent, SessionPhase};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::render;

/// What the view saw before processing ended.
#[derive(Debug, Default)]
pub struct ProgressReport {
    pub last_progress: u8,
    pub failure: Option<(String, FailureKind)>,
}

/// Follow `events` until the session leaves `PROCESSING`.
pub async fn follow(
    mut events: broadcast::Receiver<SessionEvent>,
    hidden: bool,
) -> anyhow::Result<ProgressReport> {
    let pb = if hidden {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    pb.set_style(ProgressStyle::default_bar().template("[{bar:40}] {pos:>3}% {msg}")?);
    pb.set_message(render::current_step_label(0));

    let mut report = ProgressReport::default();
    let mut started = false;

    loop {
        match events.recv().await {
            Ok(SessionEvent::Progress { value }) => {
                report.last_progress = value;
                pb.set_position(value as u64);
                pb.set_message(render::current_step_label(value));
            }
            Ok(SessionEvent::Failure { message, kind, .. }) => {
                report.failure = Some((message, kind));
            }
            Ok(SessionEvent::PhaseChanged { phase }) => match phase {
                SessionPhase::Processing => started = true,
                _ if started => break,
                _ => {}
            },
            Ok(_) => {}
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        }
    }

    if report.failure.is_some() {
        pb.abandon_with_message("failed");
    } else {
        pb.finish_with_message("done");
        if !hidden {
            eprintln!("{}", render::progress_steps(report.last_progress));
        }
    }
    Ok(report)
}
