pub use bins::{Advisory, Bin, BinGroup, BinSpec, ConfigError};
pub use parallel::{Engine, EngineBuilder, RunError};
pub use scorer::{FeatureScorer, Mode, ScoreRow, Scored, BARE_KEY};
pub use tree::{NestedCounts, RegionTree, StrandLabel};

pub mod bins;
pub mod extract;
mod parallel;
pub mod reduce;
mod scorer;
mod tree;
