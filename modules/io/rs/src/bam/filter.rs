use derive_more::Constructor;

use super::record::AlignedRead;

/// SAM flag and mapping quality based read selection.
///
/// A read is kept iff its mapping quality is at least `min_mapq`, its flags contain every bit of at
/// least one inclusion mask and share no bit with any exclusion mask. An empty inclusion list doesn't
/// constrain the flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Constructor)]
pub struct ReadFilter {
    pub include: Vec<u16>,
    pub exclude: Vec<u16>,
    pub min_mapq: u8,
}

impl ReadFilter {
    /// Properly paired, mapped mates in either orientation: 99/163 (forward), 83/147 (reverse).
    pub const DEFAULT_INCLUDE: [u16; 4] = [83, 99, 147, 163];
    /// Unmapped read (4) or unmapped mate (8).
    pub const DEFAULT_EXCLUDE: [u16; 2] = [4, 8];
    pub const DEFAULT_MIN_MAPQ: u8 = 30;

    /// Filter that keeps every read.
    pub fn permissive() -> Self {
        Self::new(Vec::new(), Vec::new(), 0)
    }

    pub fn accepts(&self, read: &AlignedRead) -> bool {
        read.mapq >= self.min_mapq
            && (self.include.is_empty()
                || self.include.iter().any(|mask| read.flags & mask == *mask))
            && self.exclude.iter().all(|mask| read.flags & mask == 0)
    }

    /// Drop rejected reads in place.
    pub fn apply(&self, reads: &mut Vec<AlignedRead>) {
        reads.retain(|x| self.accepts(x));
    }
}

impl Default for ReadFilter {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_INCLUDE.to_vec(),
            Self::DEFAULT_EXCLUDE.to_vec(),
            Self::DEFAULT_MIN_MAPQ,
        )
    }
}
