use crate::config::dates::{parse_weekdays, DateRange, DateSelection, DateSource};
use crate::config::settings::ServiceSettings;
use crate::config::toml_config::BackfillFile;
use crate::config::BackfillRun;
use crate::core::report::OutputFormat;
use crate::utils::error::{BackfillError, Result};
use crate::utils::logger::LogFormat;
use crate::utils::validation::Validate;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "race-backfill")]
#[command(about = "Replay historical dates against the race-result update endpoint")]
#[command(version)]
pub struct CliConfig {
    /// Dates to backfill (YYYY-MM-DD), posted in the order given
    #[arg(value_name = "DATE")]
    pub dates: Vec<String>,

    /// Root of the scraping service
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Seconds to wait between requests [default: 45]
    #[arg(long = "delay", env = "DELAY_SECONDS", value_name = "SECONDS")]
    pub delay_seconds: Option<u64>,

    /// Seconds allowed to establish a connection [default: 10]
    #[arg(long = "connect-timeout", env = "CONNECT_TIMEOUT_SECONDS", value_name = "SECONDS")]
    pub connect_timeout_seconds: Option<u64>,

    /// Seconds allowed for the whole request and response [default: 30]
    #[arg(long = "request-timeout", env = "REQUEST_TIMEOUT_SECONDS", value_name = "SECONDS")]
    pub request_timeout_seconds: Option<u64>,

    /// TOML file with [service] and [dates] sections
    #[arg(short, long, env = "BACKFILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// File with one date per line (replaces dates.file from the config file)
    #[arg(long, value_name = "PATH")]
    pub dates_file: Option<PathBuf>,

    /// First date of a generated range (inclusive)
    #[arg(long, requires = "to", value_name = "DATE")]
    pub from: Option<String>,

    /// Last date of a generated range (inclusive)
    #[arg(long, requires = "from", value_name = "DATE")]
    pub to: Option<String>,

    /// Keep only these weekdays from the generated range, e.g. sat,sun
    #[arg(long, value_delimiter = ',')]
    pub weekdays: Vec<String>,

    /// Print the URLs that would be posted without sending anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliConfig {
    fn service_settings(&self) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.clone(),
            delay_seconds: self.delay_seconds,
            connect_timeout_seconds: self.connect_timeout_seconds,
            request_timeout_seconds: self.request_timeout_seconds,
        }
    }

    pub fn load_file(&self) -> Result<BackfillFile> {
        match &self.config {
            Some(path) => BackfillFile::from_file(path),
            None => Ok(BackfillFile::default()),
        }
    }

    /// 日期來源順序: 設定檔 list → 日期檔 → 命令列 → 區間
    pub fn date_selection(&self, file: &BackfillFile) -> Result<DateSelection> {
        let mut selection = DateSelection::new();

        if !file.dates.list.is_empty() {
            selection.push(DateSource::Inline(file.dates.list.clone()));
        }

        if let Some(path) = self.dates_file.clone().or_else(|| file.dates_file_path()) {
            selection.push(DateSource::File(path));
        }

        if !self.dates.is_empty() {
            selection.push(DateSource::Inline(self.dates.clone()));
        }

        let range = match (&self.from, &self.to) {
            (Some(from), Some(to)) => Some(DateRange {
                from: from.clone(),
                to: to.clone(),
                weekdays: self.weekdays.clone(),
            }),
            _ => file.dates.range.clone().map(|mut range| {
                if !self.weekdays.is_empty() {
                    range.weekdays = self.weekdays.clone();
                }
                range
            }),
        };

        match range {
            Some(range) => selection.push(DateSource::Range(range)),
            None if !self.weekdays.is_empty() => {
                return Err(BackfillError::ConfigValidationError {
                    field: "weekdays".to_string(),
                    message: "--weekdays needs a date range (--from/--to or dates.range)"
                        .to_string(),
                });
            }
            None => {}
        }

        Ok(selection)
    }

    /// Flags > environment > config file > defaults.
    pub fn resolve(&self) -> Result<BackfillRun> {
        let file = self.load_file()?;
        let config = self.service_settings().or(file.service.clone()).resolve()?;
        let selection = self.date_selection(&file)?;
        if selection.is_empty() {
            tracing::warn!("⚠️ No dates given; nothing will be posted");
        }
        let dates = selection.resolve()?;
        Ok(BackfillRun { config, dates })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        self.service_settings().validate()?;
        parse_weekdays(&self.weekdays)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> CliConfig {
        let mut argv = vec!["race-backfill"];
        argv.extend_from_slice(args);
        CliConfig::try_parse_from(argv).unwrap()
    }

    fn rendered(run: &BackfillRun) -> Vec<String> {
        run.dates.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_positional_dates_keep_order_and_duplicates() {
        let cli = parse(&[
            "--base-url",
            "http://localhost:8080",
            "2024-01-07",
            "2024-01-06",
            "2024-01-07",
        ]);

        let run = cli.resolve().unwrap();
        assert_eq!(rendered(&run), vec!["2024-01-07", "2024-01-06", "2024-01-07"]);
        assert_eq!(run.config.base_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("dates.txt"), "2024-02-03\n2024-02-04\n").unwrap();
        let config_path = dir.path().join("backfill.toml");
        let mut config = std::fs::File::create(&config_path).unwrap();
        write!(
            config,
            r#"
[service]
base_url = "http://file.example:9000"
delay_seconds = 60
connect_timeout_seconds = 3

[dates]
list = ["2024-01-06"]
file = "dates.txt"
"#
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            config_path.to_str().unwrap(),
            "--base-url",
            "http://flag.example:9000",
            "--delay",
            "1",
            "--request-timeout",
            "5",
            "2024-03-02",
        ]);
        let run = cli.resolve().unwrap();

        assert_eq!(run.config.base_url.as_str(), "http://flag.example:9000/");
        assert_eq!(run.config.delay, Duration::from_secs(1));
        assert_eq!(run.config.connect_timeout, Duration::from_secs(3));
        assert_eq!(run.config.request_timeout, Duration::from_secs(5));
        assert_eq!(
            rendered(&run),
            vec!["2024-01-06", "2024-02-03", "2024-02-04", "2024-03-02"]
        );
    }

    #[test]
    fn test_generated_range_with_weekdays() {
        let cli = parse(&[
            "--base-url",
            "http://localhost:8080",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-10",
            "--weekdays",
            "sat,sun",
        ]);

        assert_eq!(rendered(&cli.resolve().unwrap()), vec!["2024-01-06", "2024-01-07"]);
    }

    #[test]
    fn test_from_without_to_rejected_by_parser() {
        assert!(CliConfig::try_parse_from(["race-backfill", "--from", "2024-01-01"]).is_err());
    }

    #[test]
    fn test_weekdays_without_range_rejected() {
        let cli = parse(&["--base-url", "http://localhost:8080", "--weekdays", "sat"]);
        assert!(matches!(
            cli.resolve(),
            Err(BackfillError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_malformed_date_rejected_before_any_request() {
        let cli = parse(&["--base-url", "http://localhost:8080", "2024-01-06", "20240107"]);
        assert!(matches!(
            cli.resolve(),
            Err(BackfillError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_flags() {
        assert!(parse(&["--base-url", "not a url"]).validate().is_err());
        assert!(parse(&["--base-url", "http://localhost:8080", "--weekdays", "someday"])
            .validate()
            .is_err());
        assert!(parse(&["--base-url", "http://localhost:8080"]).validate().is_ok());
    }

    #[test]
    fn test_no_dates_is_empty_run() {
        let run = parse(&["--base-url", "http://localhost:8080"]).resolve().unwrap();
        assert!(run.dates.is_empty());
    }

    #[test]
    fn test_environment_fills_unset_flags() {
        std::env::set_var("REQUEST_TIMEOUT_SECONDS", "7");

        let cli = parse(&["--base-url", "http://localhost:8080"]);
        let explicit = parse(&["--base-url", "http://localhost:8080", "--request-timeout", "2"]);
        std::env::remove_var("REQUEST_TIMEOUT_SECONDS");

        assert_eq!(cli.request_timeout_seconds, Some(7));
        assert_eq!(explicit.request_timeout_seconds, Some(2));
    }
}
