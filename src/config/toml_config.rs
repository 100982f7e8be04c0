use crate::config::dates::DateRange;
use crate::config::settings::ServiceSettings;
use crate::utils::error::{BackfillError, Result};
use crate::utils::validation::Validate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Optional run file:
///
/// ```toml
/// [service]
/// base_url = "${SCRAPER_URL}"
/// delay_seconds = 45
///
/// [dates]
/// list = ["2024-01-06", "2024-01-07"]
/// file = "dates.txt"
/// range = { from = "2024-01-01", to = "2024-01-31", weekdays = ["sat", "sun"] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackfillFile {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub dates: DatesSection,
    /// 相對路徑以設定檔所在目錄為準
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatesSection {
    #[serde(default)]
    pub list: Vec<String>,
    pub file: Option<PathBuf>,
    pub range: Option<DateRange>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"))
}

impl BackfillFile {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackfillError::ConfigValidationError {
                field: "config".to_string(),
                message: format!("Cannot read '{}': {}", path.display(), e),
            }
        })?;
        let mut file = Self::from_toml_str(&content)?;
        file.base_dir = path.parent().map(Path::to_path_buf);
        tracing::debug!("Loaded backfill config from {}", path.display());
        Ok(file)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let file: BackfillFile =
            toml::from_str(&processed_content).map_err(|e| BackfillError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        file.validate()?;
        Ok(file)
    }

    /// 替換環境變數 (例如 ${SCRAPER_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn dates_file_path(&self) -> Option<PathBuf> {
        let file = self.dates.file.as_ref()?;
        Some(match &self.base_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        })
    }
}

impl Validate for BackfillFile {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.service.base_url {
            if env_var_pattern().is_match(url) {
                return Err(BackfillError::ConfigValidationError {
                    field: "service.base_url".to_string(),
                    message: format!("Environment variable in '{}' is not set", url),
                });
            }
        }
        self.service.validate()
    }
}
