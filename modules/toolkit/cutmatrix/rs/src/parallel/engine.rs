use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};

use derive_more::Constructor;
use eyre::Result;
use rayon::prelude::*;
use rayon::ThreadPool;
use thread_local::ThreadLocal;

use atacmx_core_rs::source::Source;
use atacmx_core_rs::CancellationToken;
use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;

use super::error::{boxed, RunError};
use super::{EngineBuilder, Worker};
use crate::scorer::{FeatureScorer, ScoreRow, Scored};
use crate::tree::RegionTree;

/// Scores features in parallel while preserving their input order.
///
/// Features are pulled from the input in batches. Every batch is scored on the thread pool, then
/// rows are emitted and partial trees are merged on the calling thread in the input order.
#[derive(Constructor)]
pub struct Engine<Src>
where
    Src: Source<Item = AlignedRead>,
{
    pool: ThreadPool,
    prototype: Src,
    scorer: FeatureScorer,
    workers: ThreadLocal<RefCell<Worker<Src>>>,
    batch_size: usize,
    cancellation: CancellationToken,
}

impl<Src> Engine<Src>
where
    Src: Source<Item = AlignedRead>,
{
    pub fn builder(source: Src) -> EngineBuilder<Src> {
        EngineBuilder::new(source)
    }

    pub fn scorer(&self) -> &FeatureScorer {
        &self.scorer
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Score all features, passing every row to `emit` in the input order, and return the
    /// aggregate tree.
    ///
    /// The first unreadable feature, scoring failure or `emit` error aborts the run. Cancellation is
    /// checked before every batch and every feature; features already being scored are completed.
    pub fn run<I, E, F>(&mut self, features: I, mut emit: F) -> Result<RegionTree, RunError>
    where
        I: IntoIterator<Item = Result<Feature, E>>,
        E: Into<eyre::Report>,
        F: FnMut(Feature, ScoreRow) -> Result<()>,
    {
        log::info!(
            "Scoring features with {} threads in batches of {}",
            self.threads(),
            self.batch_size
        );

        let mut tree = RegionTree::new();
        let mut processed = 0;
        let mut features = features.into_iter().enumerate();
        let mut batch = Vec::with_capacity(self.batch_size);

        loop {
            if self.cancellation.is_cancelled() {
                log::warn!("Scoring cancelled after {processed} features");
                return Err(RunError::Cancelled { processed });
            }

            for (index, feature) in features.by_ref().take(self.batch_size) {
                let feature = feature.map_err(|source| RunError::Feature {
                    index,
                    source: boxed(source),
                })?;
                batch.push((index, feature));
            }
            if batch.is_empty() {
                break;
            }
            if processed == 0 {
                if let Some((_, feature)) = batch.first() {
                    self.scorer.spec().advise(feature.extension());
                }
            }

            let mut completed = Vec::with_capacity(batch.len());
            for (index, result) in self.score_batch(&mut batch) {
                match result {
                    Some(Err(err)) => {
                        return Err(RunError::Scoring {
                            index,
                            source: boxed(err),
                        })
                    }
                    Some(Ok(scored)) => completed.push(Some((index, scored))),
                    None => completed.push(None),
                }
            }

            for entry in completed {
                // Skipped features are only possible after a cancellation
                let Some((index, scored)) = entry else {
                    log::warn!("Scoring cancelled after {processed} features");
                    return Err(RunError::Cancelled { processed });
                };

                let (feature, row, partial) = scored.dissolve();
                tree.merge(partial);
                emit(feature, row).map_err(|source| RunError::Emit {
                    index,
                    source: boxed(source),
                })?;
                processed += 1;
            }
        }

        log::info!("Scored {processed} features");
        Ok(tree)
    }

    /// Score all features and return their rows in the input order together with the aggregate tree.
    #[allow(clippy::type_complexity)]
    pub fn collect<I, E>(
        &mut self,
        features: I,
    ) -> Result<(Vec<(Feature, ScoreRow)>, RegionTree), RunError>
    where
        I: IntoIterator<Item = Result<Feature, E>>,
        E: Into<eyre::Report>,
    {
        let mut rows = Vec::new();
        let tree = self.run(features, |feature, row| {
            rows.push((feature, row));
            Ok(())
        })?;
        Ok((rows, tree))
    }

    /// Close the source handles of all workers. The next run starts fresh workers.
    pub fn close(&mut self) {
        for worker in self.workers.iter_mut() {
            worker.get_mut().close();
        }
        self.workers.clear();
    }

    fn score_batch(&self, batch: &mut Vec<(usize, Feature)>) -> Vec<(usize, Option<Result<Scored>>)> {
        // Lowest index of a failed feature in the batch
        let failed = AtomicUsize::new(usize::MAX);
        let (workers, scorer, prototype) = (&self.workers, &self.scorer, &self.prototype);
        let cancellation = &self.cancellation;

        self.pool.install(|| {
            batch
                .par_drain(..)
                .map(|(index, feature)| {
                    if cancellation.is_cancelled() || index > failed.load(Ordering::Relaxed) {
                        return (index, None);
                    }

                    let result = workers
                        .get_or_try(|| Worker::start(prototype).map(RefCell::new))
                        .and_then(|worker| worker.borrow_mut().score(scorer, feature));

                    if let Err(err) = &result {
                        failed.fetch_min(index, Ordering::Relaxed);
                        log::error!("Failed to score feature #{index}: {err:?}");
                    }
                    (index, Some(result))
                })
                .collect()
        })
    }
}
