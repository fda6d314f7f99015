//! Result sink traits and types
//!
//! This module defines the trait interface for result sinks, the
//! destinations that receive the final list of harvested pairs.

use crate::crawler::QaPair;
use crate::storage::RunStatus;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Trait for result sinks
///
/// A sink receives the complete, ordered pair list once per successful
/// crawl, and is finalized with the terminal status of every crawl whether
/// or not pairs were delivered. Implementations must be thread-safe since
/// the crawl runs on its own task.
pub trait ResultSink: Send + Sync {
    /// Persists the harvested pairs as a two-column Question/Answer table
    ///
    /// # Arguments
    ///
    /// * `pairs` - The pairs in crawl order
    fn persist(&self, pairs: &[QaPair]) -> OutputResult<()>;

    /// Finalizes the output, performing any cleanup or final writes
    ///
    /// # Arguments
    ///
    /// * `status` - The final status of the crawl run
    fn finalize(&self, _status: RunStatus) -> OutputResult<()> {
        Ok(())
    }
}

/// Forwards results to several sinks in order
///
/// Stops at the first sink that fails to persist. Finalization is attempted
/// on every sink and the first error is returned.
#[derive(Default)]
pub struct FanOutSink {
    sinks: Vec<Box<dyn ResultSink>>,
}

impl FanOutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl ResultSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ResultSink for FanOutSink {
    fn persist(&self, pairs: &[QaPair]) -> OutputResult<()> {
        for sink in &self.sinks {
            sink.persist(pairs)?;
        }
        Ok(())
    }

    fn finalize(&self, status: RunStatus) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(e) = sink.finalize(status) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
