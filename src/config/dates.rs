use crate::domain::model::TargetDate;
use crate::utils::error::{BackfillError, Result};
use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inclusive calendar range, optionally restricted to some weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub weekdays: Vec<String>,
}

impl DateRange {
    pub fn expand(&self) -> Result<Vec<TargetDate>> {
        let from = TargetDate::parse("dates.range.from", &self.from)?;
        let to = TargetDate::parse("dates.range.to", &self.to)?;
        if from > to {
            return Err(BackfillError::InvalidConfigValueError {
                field: "dates.range".to_string(),
                value: format!("{}..{}", from, to),
                reason: "Range start is after range end".to_string(),
            });
        }

        let weekdays = parse_weekdays(&self.weekdays)?;

        Ok(from
            .date()
            .iter_days()
            .take_while(|d| *d <= to.date())
            .filter(|d| weekdays.is_empty() || weekdays.contains(&d.weekday()))
            .map(TargetDate::new)
            .collect())
    }
}

pub fn parse_weekdays(values: &[String]) -> Result<Vec<Weekday>> {
    values
        .iter()
        .map(|v| {
            v.trim()
                .parse::<Weekday>()
                .map_err(|_| BackfillError::InvalidConfigValueError {
                    field: "weekdays".to_string(),
                    value: v.clone(),
                    reason: "Expected a weekday such as sat or sunday".to_string(),
                })
        })
        .collect()
}

/// One input contributing dates to the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateSource {
    Inline(Vec<String>),
    File(PathBuf),
    Range(DateRange),
}

impl DateSource {
    fn resolve(&self) -> Result<Vec<TargetDate>> {
        match self {
            DateSource::Inline(values) => values
                .iter()
                .map(|v| TargetDate::parse("dates", v))
                .collect(),
            DateSource::File(path) => read_dates_file(path),
            DateSource::Range(range) => range.expand(),
        }
    }
}

/// Ordered date inputs. Resolution concatenates them in order and keeps
/// duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSelection {
    sources: Vec<DateSource>,
}

impl DateSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, source: DateSource) {
        self.sources.push(source);
    }

    pub fn with(mut self, source: DateSource) -> Self {
        self.push(source);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn resolve(&self) -> Result<Vec<TargetDate>> {
        let mut dates = Vec::new();
        for source in &self.sources {
            dates.extend(source.resolve()?);
        }
        Ok(dates)
    }
}

/// One date per line. Blank lines and anything after `#` are ignored.
pub fn parse_dates_text(origin: &str, content: &str) -> Result<Vec<TargetDate>> {
    let mut dates = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let value = line.split('#').next().unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        dates.push(TargetDate::parse(&format!("{}:{}", origin, index + 1), value)?);
    }
    Ok(dates)
}

pub fn read_dates_file<P: AsRef<Path>>(path: P) -> Result<Vec<TargetDate>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| BackfillError::ConfigValidationError {
        field: "dates.file".to_string(),
        message: format!("Cannot read '{}': {}", path.display(), e),
    })?;
    let dates = parse_dates_text(&path.display().to_string(), &content)?;
    tracing::debug!("Loaded {} dates from {}", dates.len(), path.display());
    Ok(dates)
}
