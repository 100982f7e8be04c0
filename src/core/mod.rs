pub mod backfill;
pub mod client;
pub mod report;
pub mod scratch;

pub use crate::domain::model::{RequestConfig, RequestOutcome, RunSummary, TargetDate};
pub use crate::domain::ports::{Reporter, UpdateClient};
pub use crate::utils::error::Result;
