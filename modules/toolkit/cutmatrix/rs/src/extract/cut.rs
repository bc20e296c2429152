use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;
use derive_more::Constructor;

use super::{count_positions, Extractor, Track, DEFAULT_CUT_POINT_OFFSET};
use crate::tree::StrandLabel;

/// Transposase insertion sites, i.e. read 5' ends shifted inwards by `offset` bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Constructor)]
pub struct CutPoints {
    pub offset: u64,
}

impl Default for CutPoints {
    fn default() -> Self {
        Self::new(DEFAULT_CUT_POINT_OFFSET)
    }
}

impl CutPoints {
    /// Cut point of a read or `None` if the read is too short to contain one.
    pub fn cut_point(&self, read: &AlignedRead) -> Option<i64> {
        let offset = self.offset as i64;
        if read.aligned_length() < offset + 1 {
            return None;
        }
        if read.is_reverse {
            Some(read.end - (offset + 1))
        } else {
            Some(read.start + offset)
        }
    }

    fn count(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<u64> {
        let mut counts = vec![0; feature.region_length()];
        count_positions(
            reads.iter().filter_map(|x| self.cut_point(x)),
            feature.region_start(),
            &mut counts,
        );
        counts
    }
}

impl Extractor for CutPoints {
    fn extract(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track> {
        let (reverse, forward): (Vec<&AlignedRead>, Vec<&AlignedRead>) =
            reads.iter().partition(|x| x.is_reverse);
        let mut forward = self.count(&forward, feature);
        let mut reverse = self.count(&reverse, feature);

        // Orient tracks to the feature
        if feature.is_reverse() {
            forward.reverse();
            reverse.reverse();
            std::mem::swap(&mut forward, &mut reverse);
        }

        vec![
            Track::new(Some(StrandLabel::Forward), forward),
            Track::new(Some(StrandLabel::Reverse), reverse),
        ]
    }

    fn pileup(&self, reads: &[&AlignedRead], feature: &Feature) -> Vec<Track> {
        let mut counts = self.count(reads, feature);
        if feature.is_reverse() {
            counts.reverse();
        }
        vec![Track::new(Some(StrandLabel::Both), counts)]
    }
}

#[cfg(test)]
mod tests {
    use atacmx_core_rs::loc::Strand;

    use super::*;
    use crate::extract::tests::read;

    #[test]
    fn test_cut_point() {
        let cut = CutPoints::default();
        assert_eq!(cut.cut_point(&read(100, 150, false, 200)), Some(104));
        assert_eq!(cut.cut_point(&read(100, 150, true, -200)), Some(145));

        // Reads shorter than offset + 1 can't be used
        assert_eq!(cut.cut_point(&read(100, 104, false, 4)), None);
        assert_eq!(cut.cut_point(&read(100, 105, true, -5)), Some(100));
        assert_eq!(CutPoints::new(0).cut_point(&read(7, 8, false, 1)), Some(7));
    }

    #[test]
    fn test_extract_forward_feature() -> eyre::Result<()> {
        let feature = Feature::new("chr1", 105, 115, 20)?;
        let reads = [
            read(95, 145, false, 150),
            read(60, 111, true, -150),
            read(200, 250, false, 100),
        ];
        let reads = reads.iter().collect::<Vec<_>>();

        let tracks = CutPoints::default().extract(&reads, &feature);
        assert_eq!(tracks.len(), 2);

        let mut forward = vec![0; 40];
        forward[9] = 1;
        let mut reverse = vec![0; 40];
        reverse[16] = 1;
        assert_eq!(tracks[0], Track::new(Some(StrandLabel::Forward), forward));
        assert_eq!(tracks[1], Track::new(Some(StrandLabel::Reverse), reverse));
        Ok(())
    }

    #[test]
    fn test_reverse_feature_swaps_and_reverses_tracks() -> eyre::Result<()> {
        let forward = Feature::new("chr1", 100, 121, 25)?;
        let reverse = forward.clone().with_strand(Some(Strand::Reverse));
        let reads = [
            read(90, 130, false, 100),
            read(99, 140, false, 60),
            read(70, 120, true, -100),
            read(100, 112, true, -60),
            read(100, 112, true, -60),
        ];
        let reads = reads.iter().collect::<Vec<_>>();

        let extractor = CutPoints::default();
        let expected = extractor.extract(&reads, &forward);
        let actual = extractor.extract(&reads, &reverse);

        let reversed = |x: &[u64]| x.iter().rev().copied().collect::<Vec<_>>();
        assert_eq!(actual[0].counts, reversed(&expected[1].counts));
        assert_eq!(actual[1].counts, reversed(&expected[0].counts));
        assert_eq!(actual[0].label, Some(StrandLabel::Forward));
        assert_eq!(actual[1].label, Some(StrandLabel::Reverse));

        let pileup = extractor.pileup(&reads, &forward);
        assert_eq!(pileup.len(), 1);
        assert_eq!(pileup[0].label, Some(StrandLabel::Both));
        assert_eq!(pileup[0].counts.iter().sum::<u64>(), 5);
        assert_eq!(
            extractor.pileup(&reads, &reverse)[0].counts,
            reversed(&pileup[0].counts)
        );
        Ok(())
    }
}
