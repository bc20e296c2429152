use std::fmt::{self, Display};

use atacmx_core_rs::loc::Strand;
use derive_getters::Dissolve;

use super::error::FeatureError;

/// Genomic interval with a symmetric flanking region around its center.
///
/// Fields are validated once at construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Dissolve)]
pub struct Feature {
    reference: String,
    start: u64,
    end: u64,
    name: Option<String>,
    score: Option<f64>,
    strand: Option<Strand>,
    extension: u64,
}

impl Feature {
    pub fn new(
        reference: impl Into<String>,
        start: u64,
        end: u64,
        extension: u64,
    ) -> Result<Self, FeatureError> {
        let reference = reference.into();
        if reference.is_empty() {
            return Err(FeatureError::MissingReference);
        }
        if start > end {
            return Err(FeatureError::Interval { start, end });
        }

        Ok(Self {
            reference,
            start,
            end,
            name: None,
            score: None,
            strand: None,
            extension,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn with_score(mut self, score: Option<f64>) -> Self {
        self.score = score;
        self
    }

    pub fn with_strand(mut self, strand: Option<Strand>) -> Self {
        self.strand = strand;
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    pub fn strand(&self) -> Option<Strand> {
        self.strand
    }

    pub fn extension(&self) -> u64 {
        self.extension
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    /// Center of the feature, halves are rounded up.
    pub fn center(&self) -> i64 {
        (self.start + self.length().div_ceil(2)) as i64
    }

    /// First position of the extended region. Can be negative for features close to the contig start.
    pub fn region_start(&self) -> i64 {
        self.center() - self.extension as i64
    }

    pub fn region_end(&self) -> i64 {
        self.center() + self.extension as i64
    }

    pub fn region_length(&self) -> usize {
        2 * self.extension as usize
    }

    pub fn is_reverse(&self) -> bool {
        self.strand == Some(Strand::Reverse)
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            self.reference,
            self.start,
            self.end,
            self.name.as_deref().unwrap_or_default()
        )?;
        if let Some(score) = self.score {
            write!(f, "{score}")?;
        }
        f.write_str("\t")?;
        if let Some(strand) = self.strand {
            write!(f, "{strand}")?;
        }
        write!(f, "\t{}", self.extension)
    }
}
