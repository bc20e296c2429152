use std::fmt::{self, Display};

use derive_getters::Dissolve;
use derive_more::{Constructor, Deref, From, Into};
use eyre::{Result, WrapErr};
use itertools::Itertools;

use atacmx_core_rs::source::Source;
use atacmx_io_rs::bam::{AlignedRead, ReadFilter};
use atacmx_io_rs::features::Feature;

use crate::bins::BinSpec;
use crate::extract::{
    CutPoints, Extractor, MidpointObservation, Midpoints, DEFAULT_CUT_POINT_OFFSET,
};
use crate::reduce::{aggregate_in_extended_region, combine};
use crate::tree::RegionTree;

/// Group key used when reads are scored without fragment length bins.
pub const BARE_KEY: &str = "All";

/// Signal scored around features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Transposase cut points, separately for forward and reverse reads.
    CutPoints { offset: u64 },
    /// Fragment midpoints.
    Midpoints,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::CutPoints {
            offset: DEFAULT_CUT_POINT_OFFSET,
        }
    }
}

impl Mode {
    pub fn extractor(&self) -> Box<dyn Extractor> {
        match self {
            Mode::CutPoints { offset } => Box::new(CutPoints::new(*offset)),
            Mode::Midpoints => Box::new(Midpoints),
        }
    }
}

/// Scores of a single feature in bin group order.
#[derive(Debug, Clone, Default, PartialEq, Eq, From, Into, Deref)]
pub struct ScoreRow(Vec<u64>);

impl Display for ScoreRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\t"))
    }
}

#[derive(Debug, Clone, PartialEq, Constructor, Dissolve)]
pub struct Scored {
    pub feature: Feature,
    pub row: ScoreRow,
    pub tree: RegionTree,
}

/// Scores one feature at a time against an alignment source.
#[derive(Clone)]
pub struct FeatureScorer {
    spec: BinSpec,
    filter: ReadFilter,
    mode: Mode,
    extractor: Box<dyn Extractor>,
}

impl FeatureScorer {
    pub fn new(spec: BinSpec, filter: ReadFilter, mode: Mode) -> Self {
        Self {
            extractor: mode.extractor(),
            spec,
            filter,
            mode,
        }
    }

    pub fn spec(&self) -> &BinSpec {
        &self.spec
    }

    pub fn filter(&self) -> &ReadFilter {
        &self.filter
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Fetch the reads of `[start, end)` that pass the filter. The window is clipped at zero.
    fn fetch<Src>(
        &self,
        source: &mut Src,
        feature: &Feature,
        (start, end): (i64, i64),
        reads: &mut Vec<AlignedRead>,
    ) -> Result<()>
    where
        Src: Source<Item = AlignedRead> + ?Sized,
    {
        let (start, end) = (start.max(0) as u64, end.max(0) as u64);
        source
            .fetch(feature.reference(), start, end, reads)
            .wrap_err_with(|| {
                format!(
                    "Failed to fetch reads for {}:{}-{}",
                    feature.reference(),
                    start,
                    end
                )
            })?;
        self.filter.apply(reads);
        Ok(())
    }

    pub fn score<Src>(&self, source: &mut Src, feature: Feature) -> Result<Scored>
    where
        Src: Source<Item = AlignedRead> + ?Sized,
    {
        self.score_with(source, feature, &mut Vec::new())
    }

    /// Same as [FeatureScorer::score], but reuses the given buffer for fetched reads.
    pub fn score_with<Src>(
        &self,
        source: &mut Src,
        feature: Feature,
        reads: &mut Vec<AlignedRead>,
    ) -> Result<Scored>
    where
        Src: Source<Item = AlignedRead> + ?Sized,
    {
        let window = self.extractor.window(&feature, &self.spec);
        self.fetch(source, &feature, window, reads)?;

        let mut row = Vec::new();
        let mut tree = RegionTree::new();

        if self.spec.is_empty() {
            let reads = reads.iter().collect_vec();
            for track in self.extractor.pileup(&reads, &feature) {
                tree.add_counts(BARE_KEY, track.label, &track.counts);
                row.extend(track.counts);
            }
            return Ok(Scored::new(feature, row.into(), tree));
        }

        let extension = feature.extension() as usize;
        let mut selected = Vec::with_capacity(reads.len());
        for group in self.spec.groups() {
            let mut scores = Vec::with_capacity(group.bins().len());
            for bin in group.bins() {
                selected.clear();
                selected.extend(reads.iter().filter(|x| bin.contains(x.fragment_length())));

                let mut binned = Vec::new();
                for track in self.extractor.extract(&selected, &feature) {
                    binned.extend(aggregate_in_extended_region(
                        &track.counts,
                        extension,
                        bin.resolution,
                    ));
                    tree.add_counts(group.key(), track.label, &track.counts);
                }
                scores.push(binned);
            }
            row.extend(combine(&scores));
        }

        Ok(Scored::new(feature, row.into(), tree))
    }

    /// Fragment midpoints around the feature together with their fragment sizes and positions
    /// relative to the feature center. Only the extended region itself is searched for reads.
    pub fn observe<Src>(&self, source: &mut Src, feature: &Feature) -> Result<Vec<MidpointObservation>>
    where
        Src: Source<Item = AlignedRead> + ?Sized,
    {
        let offset = match self.mode {
            Mode::CutPoints { offset } => offset,
            Mode::Midpoints => DEFAULT_CUT_POINT_OFFSET,
        };

        let mut reads = Vec::new();
        let window = (feature.region_start(), feature.region_end());
        self.fetch(source, feature, window, &mut reads)?;
        Ok(Midpoints.observe(&reads, feature, offset))
    }
}
