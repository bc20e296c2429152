use std::io;

use atacmx_core_rs::loc::InvalidStrand;
use thiserror::Error;

/// A feature record that can't be scored.
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("feature reference sequence name is empty")]
    MissingReference,

    #[error("feature start ({start}) is greater than its end ({end})")]
    Interval { start: u64, end: u64 },

    #[error("feature is missing the {field} column")]
    MissingField { field: &'static str },

    #[error("invalid feature {field}: {value:?}")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Strand(#[from] InvalidStrand),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: Box<FeatureError>,
    },

    #[error("failed to read features")]
    Io(#[from] io::Error),
}

impl FeatureError {
    pub fn at_line(self, line: usize) -> Self {
        match self {
            FeatureError::Line { .. } | FeatureError::Io(_) => self,
            other => FeatureError::Line {
                line,
                source: Box::new(other),
            },
        }
    }
}
