use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use eyre::{ensure, Result, WrapErr};
use flate2::read::MultiGzDecoder;

/// Path that stands for the standard input.
pub const STDIN: &str = "-";

pub enum DecompressedStream {
    PlainText(File),
    Gzip(MultiGzDecoder<File>),
    Stdin(io::Stdin),
}

impl DecompressedStream {
    pub fn box_bufread(self) -> Box<dyn BufRead + Send + Sync + 'static> {
        match self {
            DecompressedStream::PlainText(file) => Box::new(BufReader::new(file)),
            DecompressedStream::Gzip(decoder) => Box::new(BufReader::new(decoder)),
            DecompressedStream::Stdin(stdin) => Box::new(BufReader::new(stdin)),
        }
    }
}

/// Open a plain text or gzip-compressed file. The compression is detected from the file signature,
/// `-` reads the (uncompressed) standard input.
pub fn read_file(path: impl AsRef<Path>) -> Result<DecompressedStream> {
    let path = path.as_ref();
    if path.as_os_str() == STDIN {
        return Ok(DecompressedStream::Stdin(io::stdin()));
    }
    ensure!(path.exists(), "File {} does not exist", path.display());

    let open = || File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()));
    let kind = match infer::get_from_path(path)? {
        Some(kind) => kind,
        None => return Ok(DecompressedStream::PlainText(open()?)),
    };

    let stream = match (kind.extension(), kind.mime_type()) {
        ("gz", "application/gzip") => DecompressedStream::Gzip(MultiGzDecoder::new(open()?)),
        // Always assume plain text if there is no clear match
        _ => DecompressedStream::PlainText(open()?),
    };
    Ok(stream)
}
