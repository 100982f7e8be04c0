#[cfg(feature = "cli")]
pub mod cli;
pub mod dates;
pub mod settings;
pub mod toml_config;

use crate::domain::model::{RequestConfig, TargetDate};

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// Everything a run needs once configuration has been merged and validated.
#[derive(Debug, Clone)]
pub struct BackfillRun {
    pub config: RequestConfig,
    pub dates: Vec<TargetDate>,
}
