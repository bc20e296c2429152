use std::error::Error as StdError;

use thiserror::Error;

type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure of a scoring run. Rows emitted before the failure are complete and in input order.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("scoring was cancelled after {processed} features")]
    Cancelled { processed: usize },

    #[error("failed to read feature #{index}")]
    Feature {
        index: usize,
        #[source]
        source: BoxedError,
    },

    #[error("failed to score feature #{index}")]
    Scoring {
        index: usize,
        #[source]
        source: BoxedError,
    },

    #[error("failed to emit the scores of feature #{index}")]
    Emit {
        index: usize,
        #[source]
        source: BoxedError,
    },
}

pub(super) fn boxed(report: impl Into<eyre::Report>) -> BoxedError {
    report.into().into()
}
