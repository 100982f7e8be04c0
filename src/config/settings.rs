use crate::domain::model::RequestConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_positive_number, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://race-result-scraper.run.app";
pub const DEFAULT_DELAY_SECONDS: u64 = 45;
pub const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// One layer of service settings. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSettings {
    pub base_url: Option<String>,
    pub delay_seconds: Option<u64>,
    pub connect_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

impl ServiceSettings {
    /// 以 self 為優先，缺的欄位由 fallback 補上
    pub fn or(self, fallback: ServiceSettings) -> ServiceSettings {
        ServiceSettings {
            base_url: self.base_url.or(fallback.base_url),
            delay_seconds: self.delay_seconds.or(fallback.delay_seconds),
            connect_timeout_seconds: self
                .connect_timeout_seconds
                .or(fallback.connect_timeout_seconds),
            request_timeout_seconds: self
                .request_timeout_seconds
                .or(fallback.request_timeout_seconds),
        }
    }

    /// Applies the built-in defaults and validates the result.
    pub fn resolve(self) -> Result<RequestConfig> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let delay_seconds = self.delay_seconds.unwrap_or(DEFAULT_DELAY_SECONDS);
        let connect_timeout_seconds = self
            .connect_timeout_seconds
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS);
        let request_timeout_seconds = self
            .request_timeout_seconds
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS);

        let base_url = validate_url("base_url", &base_url)?;
        validate_positive_number("connect_timeout_seconds", connect_timeout_seconds, 1)?;
        validate_positive_number("request_timeout_seconds", request_timeout_seconds, 1)?;

        if connect_timeout_seconds > request_timeout_seconds {
            tracing::warn!(
                "⚠️ connect timeout ({}s) exceeds request timeout ({}s); the request timeout wins",
                connect_timeout_seconds,
                request_timeout_seconds
            );
        }

        Ok(RequestConfig {
            base_url,
            delay: Duration::from_secs(delay_seconds),
            connect_timeout: Duration::from_secs(connect_timeout_seconds),
            request_timeout: Duration::from_secs(request_timeout_seconds),
        })
    }
}

impl Validate for ServiceSettings {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.base_url {
            validate_url("service.base_url", url)?;
        }
        if let Some(seconds) = self.connect_timeout_seconds {
            validate_positive_number("service.connect_timeout_seconds", seconds, 1)?;
        }
        if let Some(seconds) = self.request_timeout_seconds {
            validate_positive_number("service.request_timeout_seconds", seconds, 1)?;
        }
        Ok(())
    }
}
