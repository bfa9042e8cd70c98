pub mod config;
pub mod fetch;
pub mod normalize;
pub mod parse;
pub mod pipeline;
pub mod record;
pub mod store;
pub mod summary;

pub use pipeline::{Pipeline, PipelineError, RunOutcome};
pub use record::ChampionRecord;
