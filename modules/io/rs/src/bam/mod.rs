pub use builder::ReaderBuilder;
pub use error::FormatError;
pub use filter::ReadFilter;
pub use reader::Reader;
pub use record::AlignedRead;

mod builder;
mod error;
mod filter;
mod reader;
mod record;
