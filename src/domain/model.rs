use crate::utils::error::Result;
use crate::utils::validation::{validate_date, DATE_FORMAT};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// A calendar date to backfill, rendered as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TargetDate(NaiveDate);

impl TargetDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn parse(field_name: &str, value: &str) -> Result<Self> {
        validate_date(field_name, value).map(Self)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl FromStr for TargetDate {
    type Err = crate::utils::error::BackfillError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse("dates", s)
    }
}

impl fmt::Display for TargetDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl From<NaiveDate> for TargetDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

pub const UPDATE_RESULTS_PATH: &str = "/api/races/update-results";
pub const TARGET_DATE_PARAM: &str = "target_date";

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub base_url: Url,
    pub delay: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl RequestConfig {
    /// `{base_url}/api/races/update-results?target_date={date}`
    ///
    /// A path prefix on the base URL is kept and a trailing slash is not doubled.
    pub fn update_url(&self, date: &TargetDate) -> Url {
        let mut url = self.base_url.clone();
        let prefix = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", prefix, UPDATE_RESULTS_PATH));
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut()
            .append_pair(TARGET_DATE_PARAM, &date.to_string());
        url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Connect,
    Body,
    Other,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connect",
            FailureKind::Body => "body",
            FailureKind::Other => "transport",
        };
        f.write_str(label)
    }
}

/// The call never produced a complete response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Http { code: u16 },
    TransportFailure(TransportFailure),
}

impl OutcomeStatus {
    pub fn code(&self) -> Option<u16> {
        match self {
            OutcomeStatus::Http { code } => Some(*code),
            OutcomeStatus::TransportFailure(_) => None,
        }
    }

    /// 只有 200 與 202 算成功
    pub fn is_accepted(&self) -> bool {
        matches!(self, OutcomeStatus::Http { code: 200 | 202 })
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Http { code } => write!(f, "HTTP {}", code),
            OutcomeStatus::TransportFailure(failure) => write!(f, "{}", failure),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestOutcome {
    pub date: TargetDate,
    pub url: String,
    pub status: OutcomeStatus,
    pub body: String,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn is_accepted(&self) -> bool {
        self.status.is_accepted()
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub outcomes: Vec<RequestOutcome>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn accepted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_accepted()).count()
    }

    pub fn warnings(&self) -> usize {
        self.total() - self.accepted()
    }

    pub fn transport_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::TransportFailure(_)))
            .count()
    }
}
