use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The alignment file can't be used for random access.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("alignment file {} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error(
        "alignment file {} is not an indexed BAM file (expected a .bai index next to it)",
        path.display()
    )]
    Index {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read the header of the alignment file {}", path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
