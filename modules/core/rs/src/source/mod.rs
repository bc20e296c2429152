pub use source::Source;

#[allow(clippy::module_inception)]
mod source;
