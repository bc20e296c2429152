mod cut;
mod mid;
mod position;

pub use cut::CutPoints;
pub use mid::{MidpointObservation, Midpoints};
pub use position::FragmentPosition;

use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;
use derive_more::Constructor;
use dyn_clone::DynClone;

use crate::bins::BinSpec;
use crate::tree::StrandLabel;

/// Distance between the 5' end of a read and the transposase insertion site.
pub const DEFAULT_CUT_POINT_OFFSET: u64 = 4;

/// Per-base counts over the extended region of a feature, oriented 5' to 3' relative to the feature.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Track {
    pub label: Option<StrandLabel>,
    pub counts: Vec<u64>,
}

/// Turns reads around a feature into per-base signal tracks.
pub trait Extractor: DynClone + Send + Sync {
    /// Genomic window (possibly reaching below zero) whose reads must be fetched to score the
    /// feature.
    fn window(&self, feature: &Feature, _spec: &BinSpec) -> (i64, i64) {
        (feature.region_start(), feature.region_end())
    }

    /// Tracks for reads of a single fragment length bin.
    fn extract(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track>;

    /// Tracks for all reads when no fragment length bins are configured.
    fn pileup(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track>;
}

dyn_clone::clone_trait_object!(Extractor);

/// Count positions falling inside `[start, start + counts.len())`.
fn count_positions(positions: impl Iterator<Item = i64>, start: i64, counts: &mut [u64]) {
    for position in positions {
        let ind = position - start;
        if ind >= 0 && (ind as usize) < counts.len() {
            counts[ind as usize] += 1;
        }
    }
}
