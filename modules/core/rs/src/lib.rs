pub use cancel::CancellationToken;

mod cancel;
pub mod loc;
pub mod parallelism;
pub mod source;
