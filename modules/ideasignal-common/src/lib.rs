pub mod types;
pub mod safety;
pub mod config;
pub mod error;
pub mod stats;

pub use types::*;
pub use safety::*;
pub use config::{
    load_keywords, Config, FilterConfig, RunConfig, ScoreCaps, ScoringConfig, TrustCoefficients,
};
pub use error::IdeaSignalError;
pub use stats::*;
