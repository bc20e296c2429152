use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use eyre::{OptionExt, Result, WrapErr};
use noodles::core::{Position, Region};
use noodles::csi::{self, BinningIndex};
use noodles::{bam, bgzf, sam};

use atacmx_core_rs::source::Source;

use super::error::FormatError;
use super::record::AlignedRead;

/// An open, exclusively owned handle to an indexed BAM file.
pub(super) struct Handle {
    inner: bam::io::Reader<bgzf::io::Reader<File>>,
    index: bam::bai::Index,
    record: bam::Record,
}

impl Handle {
    pub(super) fn open(path: &Path) -> Result<(Self, sam::Header), FormatError> {
        let mut index = OsString::from(path);
        index.push(".bai");

        let index = bam::bai::read(index).map_err(|source| FormatError::Index {
            path: path.to_path_buf(),
            source,
        })?;
        let file = File::open(path).map_err(|source| FormatError::Header {
            path: path.to_path_buf(),
            source,
        })?;

        let mut inner = bam::io::Reader::new(file);
        let header = inner.read_header().map_err(|source| FormatError::Header {
            path: path.to_path_buf(),
            source,
        })?;

        let handle = Self {
            inner,
            index,
            record: bam::Record::default(),
        };
        Ok((handle, header))
    }
}

/// Indexed BAM reader.
///
/// Cloning a reader doesn't duplicate its file handle: the clone starts closed and opens its own
/// handle on demand. The header is parsed once and shared between clones.
pub struct Reader {
    filename: PathBuf,
    header: Arc<sam::Header>,
    handle: Option<Handle>,
    batch_size: usize,
}

impl Reader {
    pub(super) fn new(
        filename: PathBuf,
        header: Arc<sam::Header>,
        handle: Option<Handle>,
        batch_size: usize,
    ) -> Self {
        Self {
            filename,
            header,
            handle,
            batch_size,
        }
    }

    pub fn filename(&self) -> &Path {
        &self.filename
    }

    pub fn header(&self) -> &sam::Header {
        &self.header
    }
}

impl Clone for Reader {
    fn clone(&self) -> Self {
        Self {
            filename: self.filename.clone(),
            header: Arc::clone(&self.header),
            handle: None,
            batch_size: self.batch_size,
        }
    }
}

impl Source for Reader {
    type Item = AlignedRead;

    fn open(&mut self) -> Result<()> {
        if self.handle.is_none() {
            let (handle, _) = Handle::open(&self.filename)?;
            self.handle = Some(handle);
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn fetch(
        &mut self,
        contig: &str,
        start: u64,
        end: u64,
        into: &mut Vec<Self::Item>,
    ) -> Result<()> {
        into.clear();
        if end <= start {
            return Ok(());
        }
        if into.capacity() == 0 {
            into.reserve(self.batch_size);
        }

        self.open()?;
        let header = Arc::clone(&self.header);
        let handle = self
            .handle
            .as_mut()
            .ok_or_eyre("BAM handle must be open before fetching reads")?;

        let region = Region::new(
            contig,
            Position::try_from(start as usize + 1)?..=Position::try_from(end as usize)?,
        );
        let reference_sequence_id = header
            .reference_sequences()
            .get_index_of(region.name())
            .ok_or_else(|| eyre::eyre!("Reference sequence {contig} is not present in the BAM header"))?;

        let Handle {
            inner,
            index,
            record,
        } = handle;
        let chunks = index
            .query(reference_sequence_id, region.interval())
            .wrap_err_with(|| format!("Failed to query {contig}:{start}-{end}"))?;
        let mut query = bam::io::Reader::from(csi::io::Query::new(inner.get_mut(), chunks));

        let (start, end) = (start as i64, end as i64);
        while query.read_record(record)? != 0 {
            if record.reference_sequence_id().transpose()? != Some(reference_sequence_id) {
                continue;
            }
            // Chunks are coarse, drop records outside of the window
            match AlignedRead::from_bam(record)? {
                Some(read) if read.start < end && start < read.end => into.push(read),
                _ => continue,
            }
        }
        Ok(())
    }

    fn close(&mut self) {
        self.handle = None;
    }
}
