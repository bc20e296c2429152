// Feature files are BED-like tab-separated tables. Only the first six columns are used:
// 1. reference
// 2. start: u64, 0-based
// 3. end: u64, exclusive
// 4. name (optional)
// 5. score: f64 (optional, `.` or empty for none)
// 6. strand: [+|-|.] (optional)
// Any extra columns are ignored.

mod error;
mod reader;
mod record;

pub use error::FeatureError;
pub use reader::Reader;
pub use record::Feature;
