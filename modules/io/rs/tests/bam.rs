use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use eyre::Result;
use noodles::bam;
use noodles::core::Position;
use noodles::sam;
use noodles::sam::alignment::io::Write as _;
use noodles::sam::alignment::record::cigar::{op::Kind, Op};
use noodles::sam::alignment::record::{Flags, MappingQuality};
use noodles::sam::alignment::record_buf::Cigar;
use noodles::sam::alignment::RecordBuf;
use noodles::sam::header::record::value::map::header::{sort_order::COORDINATE, tag::SORT_ORDER};
use noodles::sam::header::record::value::map::{self, ReferenceSequence};
use noodles::sam::header::record::value::Map;

use atacmx_core_rs::source::Source;
use atacmx_io_rs::bam::{AlignedRead, FormatError, ReaderBuilder};

struct Alignment {
    name: &'static str,
    contig: usize,
    // 1-based
    start: usize,
    matches: usize,
    flags: u16,
    mate_start: usize,
    template_length: i32,
}

const ALIGNMENTS: [Alignment; 3] = [
    Alignment {
        name: "r0",
        contig: 0,
        start: 96,
        matches: 50,
        flags: 99,
        mate_start: 196,
        template_length: 150,
    },
    Alignment {
        name: "r0",
        contig: 0,
        start: 196,
        matches: 50,
        flags: 147,
        mate_start: 96,
        template_length: -150,
    },
    Alignment {
        name: "r1",
        contig: 1,
        start: 11,
        matches: 30,
        flags: 163,
        mate_start: 61,
        template_length: 80,
    },
];

fn header() -> Result<sam::Header> {
    let reference = |length| NonZeroUsize::new(length).map(Map::<ReferenceSequence>::new);
    Ok(sam::Header::builder()
        .set_header(
            Map::<map::Header>::builder()
                .insert(SORT_ORDER, COORDINATE)
                .build()?,
        )
        .add_reference_sequence("chr1", reference(1_000).unwrap())
        .add_reference_sequence("chr2", reference(500).unwrap())
        .build())
}

fn write_bam(path: &Path) -> Result<()> {
    let header = header()?;
    let mut writer = bam::io::Writer::new(File::create(path)?);
    writer.write_header(&header)?;

    for alignment in &ALIGNMENTS {
        let record = RecordBuf::builder()
            .set_name(alignment.name)
            .set_flags(Flags::from(alignment.flags))
            .set_reference_sequence_id(alignment.contig)
            .set_alignment_start(Position::try_from(alignment.start)?)
            .set_mapping_quality(MappingQuality::new(60).unwrap())
            .set_cigar(Cigar::from(vec![Op::new(Kind::Match, alignment.matches)]))
            .set_mate_reference_sequence_id(alignment.contig)
            .set_mate_alignment_start(Position::try_from(alignment.mate_start)?)
            .set_template_length(alignment.template_length)
            .build();
        writer.write_alignment_record(&header, &record)?;
    }
    writer.try_finish()?;
    Ok(())
}

fn index_bam(path: &Path) -> Result<()> {
    let index = bam::fs::index(path)?;
    let mut destination = path.as_os_str().to_owned();
    destination.push(".bai");
    bam::bai::fs::write(PathBuf::from(destination), &index)?;
    Ok(())
}

fn fetch(
    source: &mut impl Source<Item = AlignedRead>,
    contig: &str,
    start: u64,
    end: u64,
) -> Result<Vec<AlignedRead>> {
    let mut reads = Vec::new();
    source.fetch(contig, start, end, &mut reads)?;
    Ok(reads)
}

#[test]
fn unusable_files_are_rejected() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = ReaderBuilder::new(dir.path().join("absent.bam")).build();
    assert!(matches!(missing, Err(FormatError::Missing { .. })));

    let path = dir.path().join("sample.bam");
    write_bam(&path)?;
    let unindexed = ReaderBuilder::new(&path).build();
    assert!(matches!(unindexed, Err(FormatError::Index { .. })));

    index_bam(&path)?;
    let reader = ReaderBuilder::new(&path).build()?;
    assert_eq!(reader.header().reference_sequences().len(), 2);
    Ok(())
}

#[test]
fn reads_are_fetched_as_half_open_intervals() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample.bam");
    write_bam(&path)?;
    index_bam(&path)?;

    let mut reader = ReaderBuilder::new(&path).with_batch_size(4).build()?;
    assert!(reader.is_open());

    let reads = fetch(&mut reader, "chr1", 0, 1_000)?;
    assert_eq!(
        reads,
        vec![
            AlignedRead {
                start: 95,
                end: 145,
                is_reverse: false,
                mapq: 60,
                flags: 99,
                template_length: 150,
                name: b"r0".to_vec(),
                mate_start: Some(195),
            },
            AlignedRead {
                start: 195,
                end: 245,
                is_reverse: true,
                mapq: 60,
                flags: 147,
                template_length: -150,
                name: b"r0".to_vec(),
                mate_start: Some(95),
            },
        ]
    );

    // Window edges
    assert!(fetch(&mut reader, "chr1", 145, 146)?.is_empty());
    assert_eq!(fetch(&mut reader, "chr1", 144, 145)?.len(), 1);
    assert!(fetch(&mut reader, "chr1", 0, 95)?.is_empty());
    assert_eq!(fetch(&mut reader, "chr1", 0, 96)?.len(), 1);
    assert_eq!(fetch(&mut reader, "chr1", 140, 200)?.len(), 2);
    assert!(fetch(&mut reader, "chr1", 300, 300)?.is_empty());

    // Reads of other contigs are never reported
    let reads = fetch(&mut reader, "chr2", 0, 500)?;
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].name, b"r1");
    assert_eq!((reads[0].start, reads[0].end), (10, 40));
    Ok(())
}

#[test]
fn clones_open_private_handles() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample.bam");
    write_bam(&path)?;
    index_bam(&path)?;

    let mut reader = ReaderBuilder::new(&path).build()?;
    let mut clone = reader.clone();
    assert!(!clone.is_open());
    assert_eq!(clone.filename(), reader.filename());

    // Fetching opens the handle on demand
    assert_eq!(fetch(&mut clone, "chr1", 100, 110)?.len(), 1);
    assert!(clone.is_open());

    clone.close();
    assert!(!clone.is_open());
    assert!(reader.is_open());
    assert_eq!(fetch(&mut reader, "chr1", 100, 110)?.len(), 1);

    clone.open()?;
    assert!(clone.is_open());
    Ok(())
}

#[test]
fn unknown_contigs_are_errors() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sample.bam");
    write_bam(&path)?;
    index_bam(&path)?;

    let mut reader = ReaderBuilder::new(&path).build()?;
    let err = fetch(&mut reader, "chrZ", 0, 10).unwrap_err();
    assert!(err.to_string().contains("chrZ"), "{err:?}");

    // The reader stays usable
    assert_eq!(fetch(&mut reader, "chr2", 0, 20)?.len(), 1);
    Ok(())
}
