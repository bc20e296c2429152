use std::io;

use noodles::bam;
use noodles::sam::alignment::Record as _;

/// Fields of an aligned read consumed by the scoring code.
///
/// Coordinates are 0-based, `end` is one past the last aligned base. The template length keeps the
/// SAM sign convention: it is negative for the rightmost mate of a pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlignedRead {
    pub start: i64,
    pub end: i64,
    pub is_reverse: bool,
    pub mapq: u8,
    pub flags: u16,
    pub template_length: i64,
    pub name: Vec<u8>,
    pub mate_start: Option<i64>,
}

impl AlignedRead {
    /// Number of reference bases covered by the alignment.
    pub fn aligned_length(&self) -> i64 {
        self.end - self.start
    }

    /// Absolute template length, i.e. the sequenced fragment size.
    pub fn fragment_length(&self) -> u64 {
        self.template_length.unsigned_abs()
    }

    /// Convert a BAM record. Records without alignment coordinates (e.g. unplaced reads) yield `None`.
    pub fn from_bam(record: &bam::Record) -> io::Result<Option<Self>> {
        let (start, end) = match (
            record.alignment_start().transpose()?,
            record.alignment_end().transpose()?,
        ) {
            (Some(start), Some(end)) => (start, end),
            _ => return Ok(None),
        };

        let mate_start = record
            .mate_alignment_start()
            .transpose()?
            .map(|x| usize::from(x) as i64 - 1);

        let flags = record.flags();
        let name = record
            .name()
            .map(|x| AsRef::<[u8]>::as_ref(x).to_vec())
            .unwrap_or_default();

        Ok(Some(Self {
            // 1-based inclusive -> 0-based half-open
            start: usize::from(start) as i64 - 1,
            end: usize::from(end) as i64,
            is_reverse: flags.is_reverse_complemented(),
            mapq: record.mapping_quality().map(|x| x.get()).unwrap_or(255),
            flags: u16::from(flags),
            template_length: i64::from(record.template_length()),
            name,
            mate_start,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_length_ignores_sign() {
        let read = AlignedRead {
            start: 150,
            end: 200,
            is_reverse: true,
            template_length: -120,
            ..Default::default()
        };
        assert_eq!(read.fragment_length(), 120);
        assert_eq!(read.aligned_length(), 50);
    }
}
