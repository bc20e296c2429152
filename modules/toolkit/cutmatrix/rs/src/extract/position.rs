use std::fmt::{self, Display};

use atacmx_io_rs::bam::AlignedRead;
use atacmx_io_rs::features::Feature;

/// Location of a sequenced fragment relative to the center of a feature, in feature orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FragmentPosition {
    /// Both cut points are upstream of the center.
    Left,
    /// The fragment spans the center.
    Overlapping,
    /// Both cut points are downstream of the center.
    Right,
}

impl FragmentPosition {
    /// Cut points at both ends of the fragment the read belongs to.
    ///
    /// The far end of a forward read's fragment is derived from the template length, the far end of a
    /// reverse read's fragment is the start of its mate.
    pub fn cut_points(read: &AlignedRead, offset: u64) -> (i64, i64) {
        let offset = offset as i64;
        if read.is_reverse {
            let start = read.mate_start.unwrap_or(read.start);
            (start + offset, read.end - (offset + 1))
        } else {
            (
                read.start + offset,
                read.start + read.template_length - (offset + 1),
            )
        }
    }

    pub fn of(read: &AlignedRead, offset: u64, feature: &Feature) -> Self {
        let (first, second) = Self::cut_points(read, offset);
        let center = feature.center();

        let position = if center > first.max(second) {
            FragmentPosition::Left
        } else if center < first.min(second) {
            FragmentPosition::Right
        } else {
            FragmentPosition::Overlapping
        };

        if feature.is_reverse() {
            position.flipped()
        } else {
            position
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            FragmentPosition::Left => FragmentPosition::Right,
            FragmentPosition::Overlapping => FragmentPosition::Overlapping,
            FragmentPosition::Right => FragmentPosition::Left,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            FragmentPosition::Left => 'L',
            FragmentPosition::Overlapping => 'O',
            FragmentPosition::Right => 'R',
        }
    }
}

impl Display for FragmentPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
