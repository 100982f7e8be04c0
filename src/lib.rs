pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::BackfillRun;
pub use crate::core::{
    backfill::BackfillDriver,
    client::HttpUpdateClient,
    report::{ConsoleReporter, OutputFormat},
    scratch::ScratchBuffer,
};
pub use domain::model::{OutcomeStatus, RequestConfig, RequestOutcome, RunSummary, TargetDate};
pub use utils::error::{BackfillError, Result};
