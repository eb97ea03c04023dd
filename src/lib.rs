pub mod cli;
pub mod error;
pub mod layout;
pub mod logger;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod solutions;
pub mod timing;

#[cfg(test)]
mod fixtures;

pub use error::{Result, StatsError};
pub use layout::Layout;
pub use pipeline::{run, Aggregates};
pub use report::Outputs;
