//! Normalization run: traversal, dispatch and plan execution.

mod error;
mod executor;
mod types;
mod walker;

pub use error::NormalizeError;
pub use executor::PlanExecutor;
pub use types::{FileOutcome, NormalizeOptions, RunReport, SkipReason};
pub use walker::TreeWalker;
