use eyre::{Result, WrapErr};

use atacmx_core_rs::source::Source;
use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;

use crate::scorer::{FeatureScorer, Scored};

/// Scoring state owned by a single pool thread.
///
/// A thread without a worker is uninitialized. A worker is created (and its private source handle
/// opened) right before the thread scores its first feature and stays ready until the engine closes
/// it.
pub struct Worker<Src> {
    source: Src,
    reads: Vec<AlignedRead>,
    processed: usize,
}

impl<Src> Worker<Src>
where
    Src: Source<Item = AlignedRead>,
{
    pub fn start(prototype: &Src) -> Result<Self> {
        let mut source = dyn_clone::clone(prototype);
        source
            .open()
            .wrap_err("Failed to open a private handle to the alignment source")?;
        log::debug!(
            "Worker {} started",
            std::thread::current().name().unwrap_or("<unnamed>")
        );

        Ok(Self {
            source,
            reads: Vec::new(),
            processed: 0,
        })
    }

    pub fn score(&mut self, scorer: &FeatureScorer, feature: Feature) -> Result<Scored> {
        let scored = scorer.score_with(&mut self.source, feature, &mut self.reads)?;
        self.processed += 1;
        Ok(scored)
    }

    pub fn close(&mut self) {
        self.source.close();
        self.reads = Vec::new();
        log::debug!("Worker closed after scoring {} features", self.processed);
    }
}
