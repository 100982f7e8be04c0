use crate::domain::model::{OutcomeStatus, RequestConfig, RequestOutcome, RunSummary, TargetDate};
use crate::domain::ports::Reporter;
use crate::utils::error::Result;
use serde_json::json;
use std::io::{self, Write};
use url::Url;

pub const COMPLETION_MARKER: &str = "All done.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Writes the report to an "out" stream and warnings to an "err" stream.
pub struct ConsoleReporter<O: Write + Send, E: Write + Send> {
    out: O,
    err: E,
    format: OutputFormat,
}

impl ConsoleReporter<io::Stdout, io::Stderr> {
    pub fn stdio(format: OutputFormat) -> Self {
        Self::new(io::stdout(), io::stderr(), format)
    }
}

impl<O: Write + Send, E: Write + Send> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E, format: OutputFormat) -> Self {
        Self { out, err, format }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    fn emit_json(&mut self, value: serde_json::Value) -> Result<()> {
        serde_json::to_writer(&mut self.out, &value)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

fn describe_status(status: &OutcomeStatus) -> String {
    match status {
        OutcomeStatus::Http { code } => code.to_string(),
        OutcomeStatus::TransportFailure(failure) => format!("none ({})", failure),
    }
}

impl<O: Write + Send, E: Write + Send> Reporter for ConsoleReporter<O, E> {
    fn run_started(&mut self, config: &RequestConfig, dates: &[TargetDate]) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "BASE_URL={}", config.base_url)?;
                writeln!(self.out, "DELAY_SECONDS={}", config.delay.as_secs())?;
                writeln!(
                    self.out,
                    "CONNECT_TIMEOUT_SECONDS={}",
                    config.connect_timeout.as_secs()
                )?;
                writeln!(
                    self.out,
                    "REQUEST_TIMEOUT_SECONDS={}",
                    config.request_timeout.as_secs()
                )?;
                writeln!(self.out, "DATES={}", dates.len())?;
                self.out.flush()?;
                Ok(())
            }
            OutputFormat::Json => self.emit_json(json!({
                "event": "config",
                "base_url": config.base_url.as_str(),
                "delay_seconds": config.delay.as_secs(),
                "connect_timeout_seconds": config.connect_timeout.as_secs(),
                "request_timeout_seconds": config.request_timeout.as_secs(),
                "dates": dates,
            })),
        }
    }

    fn request_started(&mut self, position: usize, total: usize, url: &Url) -> Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(self.out)?;
            writeln!(self.out, "[{}/{}] POST {}", position, total, url)?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn outcome(&mut self, outcome: &RequestOutcome) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out, "HTTP status: {}", describe_status(&outcome.status))?;
                writeln!(self.out, "Body: {}", outcome.body)?;
                self.out.flush()?;
                Ok(())
            }
            OutputFormat::Json => {
                let mut value = serde_json::to_value(outcome)?;
                if let Some(map) = value.as_object_mut() {
                    map.insert("event".to_string(), json!("outcome"));
                }
                self.emit_json(value)
            }
        }
    }

    fn warning(&mut self, outcome: &RequestOutcome) -> Result<()> {
        let detail = match &outcome.status {
            OutcomeStatus::Http { code } => format!("unexpected HTTP status {}", code),
            OutcomeStatus::TransportFailure(failure) => format!("request failed ({})", failure),
        };
        writeln!(
            self.err,
            "WARNING: target_date={} {}",
            outcome.date, detail
        )?;
        self.err.flush()?;
        Ok(())
    }

    fn run_finished(&mut self, summary: &RunSummary) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "{} {} dates processed, {} accepted, {} warnings",
                    COMPLETION_MARKER,
                    summary.total(),
                    summary.accepted(),
                    summary.warnings()
                )?;
                self.out.flush()?;
                Ok(())
            }
            OutputFormat::Json => self.emit_json(json!({
                "event": "done",
                "total": summary.total(),
                "accepted": summary.accepted(),
                "warnings": summary.warnings(),
                "transport_failures": summary.transport_failures(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FailureKind, TransportFailure};
    use std::time::Duration;

    fn config() -> RequestConfig {
        RequestConfig {
            base_url: Url::parse("https://scraper.example.com").unwrap(),
            delay: Duration::from_secs(45),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    fn outcome(status: OutcomeStatus, body: &str) -> RequestOutcome {
        let date: TargetDate = "2024-01-06".parse().unwrap();
        RequestOutcome {
            url: config().update_url(&date).to_string(),
            date,
            status,
            body: body.to_string(),
            elapsed: Duration::from_millis(40),
        }
    }

    fn text(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_text_report() {
        let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), OutputFormat::Text);
        let dates: Vec<TargetDate> = vec!["2024-01-06".parse().unwrap()];
        let accepted = outcome(OutcomeStatus::Http { code: 202 }, "{\"message\":\"started\"}");

        reporter.run_started(&config(), &dates).unwrap();
        reporter
            .request_started(1, 1, &config().update_url(&dates[0]))
            .unwrap();
        reporter.outcome(&accepted).unwrap();
        reporter
            .run_finished(&RunSummary {
                outcomes: vec![accepted],
            })
            .unwrap();

        let (out, err) = reporter.into_inner();
        let out = text(out);
        assert!(out.contains("BASE_URL=https://scraper.example.com/"));
        assert!(out.contains("DELAY_SECONDS=45"));
        assert!(out.contains(
            "[1/1] POST https://scraper.example.com/api/races/update-results?target_date=2024-01-06"
        ));
        assert!(out.contains("HTTP status: 202"));
        assert!(out.contains("Body: {\"message\":\"started\"}"));
        assert!(out.contains("All done. 1 dates processed, 1 accepted, 0 warnings"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_warnings_go_to_err_stream() {
        let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), OutputFormat::Text);

        reporter
            .warning(&outcome(OutcomeStatus::Http { code: 500 }, "boom"))
            .unwrap();
        reporter
            .warning(&outcome(
                OutcomeStatus::TransportFailure(TransportFailure::new(
                    FailureKind::Connect,
                    "connection refused",
                )),
                "",
            ))
            .unwrap();

        let (out, err) = reporter.into_inner();
        let err = text(err);
        assert!(out.is_empty());
        assert_eq!(err.lines().count(), 2);
        assert!(err.contains("WARNING: target_date=2024-01-06 unexpected HTTP status 500"));
        assert!(err.contains(
            "WARNING: target_date=2024-01-06 request failed (connect failure: connection refused)"
        ));
    }

    #[test]
    fn test_json_lines_report() {
        let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), OutputFormat::Json);
        let dates: Vec<TargetDate> = vec!["2024-01-06".parse().unwrap()];
        let failed = outcome(OutcomeStatus::Http { code: 503 }, "");

        reporter.run_started(&config(), &dates).unwrap();
        reporter
            .request_started(1, 1, &config().update_url(&dates[0]))
            .unwrap();
        reporter.outcome(&failed).unwrap();
        reporter
            .run_finished(&RunSummary {
                outcomes: vec![failed],
            })
            .unwrap();

        let (out, _) = reporter.into_inner();
        let lines: Vec<serde_json::Value> = text(out)
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "config");
        assert_eq!(lines[0]["dates"][0], "2024-01-06");
        assert_eq!(lines[1]["event"], "outcome");
        assert_eq!(lines[1]["status"]["code"], 503);
        assert_eq!(lines[2]["event"], "done");
        assert_eq!(lines[2]["warnings"], 1);
    }
}
