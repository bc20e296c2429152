use std::path::PathBuf;
use std::sync::Arc;

use super::error::FormatError;
use super::reader::{Handle, Reader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderBuilder {
    filename: PathBuf,
    batch_size: Option<usize>,
}

impl ReaderBuilder {
    const DEFAULT_BATCH_SIZE: usize = 1024;

    pub fn new<T: Into<PathBuf>>(filename: T) -> Self {
        Self {
            filename: filename.into(),
            batch_size: None,
        }
    }

    /// Initial capacity of the buffer used to collect reads for a single window.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Open the file once to make sure that it exists, is indexed and has a readable header.
    /// The returned reader keeps this handle open.
    pub fn build(self) -> Result<Reader, FormatError> {
        if !self.filename.exists() {
            return Err(FormatError::Missing {
                path: self.filename,
            });
        }

        let (handle, header) = Handle::open(&self.filename)?;
        let batch_size = self.batch_size.unwrap_or(Self::DEFAULT_BATCH_SIZE);

        log::debug!(
            "Opened {} ({} reference sequences)",
            self.filename.display(),
            header.reference_sequences().len()
        );

        Ok(Reader::new(
            self.filename,
            Arc::new(header),
            Some(handle),
            batch_size,
        ))
    }
}
