use crate::utils::error::{BackfillError, Result};
use chrono::NaiveDate;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_url(field_name: &str, url_str: &str) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(BackfillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            "http" | "https" => Err(BackfillError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: "URL has no host".to_string(),
            }),
            scheme => Err(BackfillError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(BackfillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(BackfillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// 解析 `YYYY-MM-DD`，前後空白忽略
pub fn validate_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    // chrono 接受 `2024-1-5`，這裡要求嚴格的十位格式
    if trimmed.len() != 10 {
        return Err(BackfillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a date in YYYY-MM-DD format".to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| {
        BackfillError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Not a valid calendar date: {}", e),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("base_url", "https://example.com").is_ok());
        assert!(validate_url("base_url", "http://127.0.0.1:8080/prefix").is_ok());
        assert!(validate_url("base_url", "").is_err());
        assert!(validate_url("base_url", "invalid-url").is_err());
        assert!(validate_url("base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("request_timeout_seconds", 30, 1).is_ok());
        assert!(validate_positive_number("request_timeout_seconds", 0, 1).is_err());
        assert!(validate_positive_number("delay_seconds", 0, 0).is_ok());
    }

    #[test]
    fn test_validate_date() {
        let date = validate_date("dates", "2024-02-29").unwrap();
        assert_eq!(date.to_string(), "2024-02-29");
        assert!(validate_date("dates", " 2024-01-06 ").is_ok());

        assert!(validate_date("dates", "2023-02-29").is_err());
        assert!(validate_date("dates", "2024-1-6").is_err());
        assert!(validate_date("dates", "2024/01/06").is_err());
        assert!(validate_date("dates", "").is_err());
    }
}
