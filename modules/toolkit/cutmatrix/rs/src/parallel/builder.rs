use eyre::Result;
use thread_local::ThreadLocal;

use atacmx_core_rs::parallelism;
use atacmx_core_rs::source::Source;
use atacmx_core_rs::CancellationToken;
use atacmx_io_rs::bam::{AlignedRead, ReadFilter};

use super::Engine;
use crate::bins::BinSpec;
use crate::scorer::{FeatureScorer, Mode};

pub struct EngineBuilder<Src> {
    source: Src,
    threads: isize,
    batch_size: usize,
    mode: Mode,
    spec: BinSpec,
    filter: ReadFilter,
    cancellation: CancellationToken,
}

impl<Src> EngineBuilder<Src>
where
    Src: Source<Item = AlignedRead>,
{
    pub const DEFAULT_BATCH_SIZE: usize = 256;

    /// Each worker thread scores features with its own clone of the `source`.
    pub fn new(source: Src) -> Self {
        Self {
            source,
            threads: 1,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            mode: Mode::default(),
            spec: BinSpec::default(),
            filter: ReadFilter::default(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Number of worker threads, see [parallelism::available] for the accepted values.
    pub fn with_threads(mut self, threads: isize) -> Self {
        self.threads = threads;
        self
    }

    /// Number of features pulled from the input and scored in parallel at once.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_bins(mut self, spec: BinSpec) -> Self {
        self.spec = spec;
        self
    }

    pub fn with_filter(mut self, filter: ReadFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn build(self) -> Result<Engine<Src>> {
        let pool = parallelism::pool(self.threads, "atacmx-worker")?;
        log::debug!(
            "Scoring engine: {} threads, {:?}, {} bin groups",
            pool.current_num_threads(),
            self.mode,
            self.spec.groups().len()
        );

        let scorer = FeatureScorer::new(self.spec, self.filter, self.mode);
        Ok(Engine::new(
            pool,
            self.source,
            scorer,
            ThreadLocal::new(),
            self.batch_size,
            self.cancellation,
        ))
    }
}
