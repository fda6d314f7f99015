//! Progress reporting from the crawl worker
//!
//! The worker never touches a front end directly. It emits
//! [`ProgressEvent`]s into a [`ProgressSink`] supplied by the caller.

use std::fmt;
use tokio::sync::mpsc::UnboundedSender;

/// A discrete step in the life of a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// The crawl has begun
    Started,

    /// Number of distinct category pages found on the homepage
    CategoriesFound(usize),

    /// Number of distinct question pages to visit
    QuestionsFound(usize),

    /// Share of question pages processed so far (0-100)
    Progress(u8),

    /// Homepage fallback found unequal numbers of questions and answers
    CountMismatch { questions: usize, answers: usize },

    /// Pairs were handed to the result sink
    Completed { pairs: usize },

    /// The cancellation token stopped the crawl
    Cancelled,

    /// The crawl ended with an error
    Failed(String),
}

impl ProgressEvent {
    /// Terminal events end a crawl; exactly one is emitted per crawl
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::CountMismatch { .. } | Self::Completed { .. } | Self::Cancelled | Self::Failed(_)
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "Started"),
            Self::CategoriesFound(count) => write!(f, "Categories: {}", count),
            Self::QuestionsFound(count) => write!(f, "QA: {}", count),
            Self::Progress(percent) => write!(f, "Processing {}%", percent),
            Self::CountMismatch { questions, answers } => write!(
                f,
                "Question and answer counts do not match ({} questions, {} answers)",
                questions, answers
            ),
            Self::Completed { pairs } => write!(f, "Finished: {} pairs saved", pairs),
            Self::Cancelled => write!(f, "Cancelled"),
            Self::Failed(message) => write!(f, "An error occurred: {}", message),
        }
    }
}

/// Receiver of progress events
///
/// Called from the crawl worker only. Implementations must return promptly.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        // A closed receiver means nobody is listening any more
        if self.send(event).is_err() {
            tracing::debug!("Progress receiver dropped");
        }
    }
}

/// Writes every event to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match &event {
            ProgressEvent::Failed(_) => tracing::error!("{}", event),
            ProgressEvent::CountMismatch { .. } => tracing::warn!("{}", event),
            _ => tracing::info!("{}", event),
        }
    }
}

/// Percentage of `done` out of `total`, rounded to the nearest integer
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total);
    ((done * 100 + total / 2) / total) as u8
}
