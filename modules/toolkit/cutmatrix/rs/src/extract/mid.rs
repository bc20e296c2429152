use std::fmt::{self, Display};

use ahash::AHashSet;
use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;
use derive_more::Constructor;

use super::{count_positions, Extractor, FragmentPosition, Track};
use crate::bins::BinSpec;

/// Centers of sequenced fragments. Each read pair contributes a single midpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Midpoints;

/// A fragment midpoint found around a feature.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct MidpointObservation {
    pub center: i64,
    pub midpoint: i64,
    /// Signed distance from the feature center, in feature orientation.
    pub distance: i64,
    pub fragment_length: u64,
    pub position: FragmentPosition,
}

impl Display for MidpointObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.center, self.midpoint, self.distance, self.fragment_length, self.position
        )
    }
}

impl Midpoints {
    /// Template lengths are negative for reverse reads, so halving them moves back from the read end.
    pub fn midpoint(read: &AlignedRead) -> i64 {
        let half = read.template_length.div_euclid(2);
        if read.is_reverse {
            read.end + half
        } else {
            read.start + half
        }
    }

    /// Keep the first read of every pair.
    fn first_mates<'a>(reads: impl Iterator<Item = &'a AlignedRead>) -> Vec<&'a AlignedRead> {
        let mut seen = AHashSet::new();
        reads
            .filter(|x| x.name.is_empty() || seen.insert(x.name.as_slice()))
            .collect()
    }

    fn count(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<u64> {
        let mut counts = vec![0; feature.region_length()];
        count_positions(
            Self::first_mates(reads.iter().copied())
                .into_iter()
                .map(Self::midpoint),
            feature.region_start(),
            &mut counts,
        );
        if feature.is_reverse() {
            counts.reverse();
        }
        counts
    }

    /// Describe every fragment whose midpoint lies within the extended region (both ends included).
    pub fn observe(
        &self,
        reads: &[AlignedRead],
        feature: &Feature,
        offset: u64,
    ) -> Vec<MidpointObservation> {
        let center = feature.center();
        let (start, end) = (feature.region_start(), feature.region_end());

        Self::first_mates(reads.iter())
            .into_iter()
            .filter_map(|read| {
                let midpoint = Self::midpoint(read);
                if midpoint < start || midpoint > end {
                    return None;
                }
                let distance = if feature.is_reverse() {
                    center - midpoint
                } else {
                    midpoint - center
                };
                Some(MidpointObservation::new(
                    center,
                    midpoint,
                    distance,
                    read.fragment_length(),
                    FragmentPosition::of(read, offset, feature),
                ))
            })
            .collect()
    }
}

impl Extractor for Midpoints {
    /// Mates of fragments centered in the region can be up to half of the longest fragment away.
    fn window(&self, feature: &Feature, spec: &BinSpec) -> (i64, i64) {
        let padding = (spec.max_length().unwrap_or(0) / 2) as i64;
        (
            feature.region_start() - padding,
            feature.region_end() + padding,
        )
    }

    fn extract(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track> {
        vec![Track::new(None, self.count(reads, feature))]
    }

    fn pileup(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track> {
        self.extract(reads, feature)
    }
}
