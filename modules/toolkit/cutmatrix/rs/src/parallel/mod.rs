pub use builder::EngineBuilder;
pub use engine::Engine;
pub use error::RunError;
use worker::Worker;

mod builder;
mod engine;
mod error;
mod worker;
