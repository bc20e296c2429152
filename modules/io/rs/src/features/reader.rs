use std::io::{BufRead, Cursor};
use std::path::Path;

use atacmx_core_rs::loc::Strand;
use eyre::Result;

use super::error::FeatureError;
use super::record::Feature;
use crate::compression;

/// Lazy reader of features from a tab-separated table.
///
/// Blank lines, `#` comments and `track`/`browser` header lines are skipped. Every other line must
/// hold at least the reference, start and end columns.
pub struct Reader<R> {
    reader: R,
    buffer: String,
    line: usize,
    extension: u64,
}

impl<R: BufRead> Reader<R> {
    pub fn new(reader: R, extension: u64) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
            extension,
        }
    }

    /// Parse the next feature. Returns `None` once the input is exhausted.
    pub fn read_feature(&mut self) -> Result<Option<Feature>, FeatureError> {
        loop {
            self.buffer.clear();
            if self.reader.read_line(&mut self.buffer)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.trim().is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }

            return parse(line, self.extension)
                .map(Some)
                .map_err(|err| err.at_line(self.line));
        }
    }
}

impl Reader<Box<dyn BufRead + Send + Sync + 'static>> {
    /// Open a plain or gzip-compressed feature file, `-` reads the standard input.
    pub fn from_path(path: impl AsRef<Path>, extension: u64) -> Result<Self> {
        let stream = compression::read_file(path)?;
        Ok(Self::new(stream.box_bufread(), extension))
    }
}

impl<T: AsRef<[u8]>> Reader<Cursor<T>> {
    pub fn from_bytes(content: T, extension: u64) -> Self {
        Self::new(Cursor::new(content), extension)
    }
}

impl<R: BufRead> Iterator for Reader<R> {
    type Item = Result<Feature, FeatureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_feature().transpose()
    }
}

fn parse(line: &str, extension: u64) -> Result<Feature, FeatureError> {
    let mut columns = line.split('\t');
    let mut next = |field| columns.next().ok_or(FeatureError::MissingField { field });

    let reference = next("reference")?;
    let start = coordinate("start", next("start")?)?;
    let end = coordinate("end", next("end")?)?;
    let feature = Feature::new(reference, start, end, extension)?;

    let name = next("name").unwrap_or_default();
    let score = match next("score").unwrap_or_default() {
        "" | "." => None,
        value => Some(value.parse::<f64>().map_err(|_| FeatureError::InvalidValue {
            field: "score",
            value: value.to_owned(),
        })?),
    };
    let strand = Strand::parse_optional(next("strand").unwrap_or_default())?;

    Ok(feature
        .with_name(name)
        .with_score(score)
        .with_strand(strand))
}

fn coordinate(field: &'static str, value: &str) -> Result<u64, FeatureError> {
    value
        .trim()
        .parse()
        .map_err(|_| FeatureError::InvalidValue {
            field,
            value: value.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    const CONTENT: &str = "\
track name=motifs
# comment
chr1\t100\t120\tCTCF_1\t12.5\t+\textra\tcolumns

chr2\t0\t7
chrX\t50\t60\t.\t.\t-
";

    fn expected() -> Vec<Feature> {
        vec![
            Feature::new("chr1", 100, 120, 30)
                .unwrap()
                .with_name("CTCF_1")
                .with_score(Some(12.5))
                .with_strand(Some(Strand::Forward)),
            Feature::new("chr2", 0, 7, 30).unwrap(),
            Feature::new("chrX", 50, 60, 30)
                .unwrap()
                .with_name(".")
                .with_strand(Some(Strand::Reverse)),
        ]
    }

    #[test]
    fn test_read_features() -> Result<()> {
        let features = Reader::from_bytes(CONTENT, 30).collect::<Result<Vec<_>, _>>()?;
        assert_eq!(features, expected());
        Ok(())
    }

    #[test]
    fn test_read_gzipped_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("features.bed.gz");
        let mut encoder = GzEncoder::new(std::fs::File::create(&path)?, Compression::default());
        encoder.write_all(CONTENT.as_bytes())?;
        encoder.finish()?;

        let features = Reader::from_path(&path, 30)?.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(features, expected());
        Ok(())
    }

    #[test]
    fn test_malformed_lines_report_line_number() {
        let mut reader = Reader::from_bytes("chr1\t1\t2\nchr1\tten\t20\n", 10);
        assert!(reader.next().is_some_and(|x| x.is_ok()));
        match reader.next() {
            Some(Err(FeatureError::Line { line, source })) => {
                assert_eq!(line, 2);
                assert!(matches!(
                    *source,
                    FeatureError::InvalidValue { field: "start", .. }
                ));
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        let mut reader = Reader::from_bytes("chr1\t30\t20\n", 10);
        assert!(matches!(
            reader.next(),
            Some(Err(FeatureError::Line { line: 1, .. }))
        ));

        let mut reader = Reader::from_bytes("chr1\t30\n", 10);
        assert!(matches!(reader.next(), Some(Err(FeatureError::Line { .. }))));

        let mut reader = Reader::from_bytes("chr1\t10\t20\tname\t0\t*\n", 10);
        assert!(matches!(reader.next(), Some(Err(FeatureError::Line { .. }))));
        assert!(reader.next().is_none());
    }
}
