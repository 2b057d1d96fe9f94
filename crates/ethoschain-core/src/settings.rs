use std::path::PathBuf;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::investigator::DEFAULT_MAX_FINDINGS;
use crate::model::RiskThresholds;

const DEFAULT_NEWS_TIMEOUT_SECS: u64 = 10;

/// Explicit configuration for one audit pipeline, built once at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub thresholds: RiskThresholds,
    pub max_findings_per_audit: usize,
    /// Directory holding `keywords.txt`; the built-in table is used when unset.
    pub rules_dir: Option<PathBuf>,
    pub news: NewsSettings,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            max_findings_per_audit: DEFAULT_MAX_FINDINGS,
            rules_dir: None,
            news: NewsSettings::default(),
        }
    }
}

/// Optional real news-search backend; the mock source is used without an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsSettings {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for NewsSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            timeout_secs: DEFAULT_NEWS_TIMEOUT_SECS,
        }
    }
}

impl AuditSettings {
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.max_findings_per_audit == 0 {
            bail!("max_findings_per_audit must be greater than zero");
        }
        if self.news.timeout_secs == 0 {
            bail!("news.timeout_secs must be greater than zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_prototype_values() {
        let settings = AuditSettings::default();
        assert_eq!(settings.thresholds.yellow, 30);
        assert_eq!(settings.thresholds.red, 70);
        assert_eq!(settings.max_findings_per_audit, 50);
        assert_eq!(settings.news.timeout_secs, 10);
        assert!(settings.news.endpoint.is_none());
        settings.validate().unwrap();
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let settings: AuditSettings =
            serde_json::from_str(r#"{"thresholds": {"red": 80}, "news": {"timeout_secs": 3}}"#)
                .unwrap();
        assert_eq!(settings.thresholds.yellow, 30);
        assert_eq!(settings.thresholds.red, 80);
        assert_eq!(settings.news.timeout_secs, 3);
        assert_eq!(settings.max_findings_per_audit, 50);
    }

    #[test]
    fn validation_rejects_zero_limits() {
        let settings = AuditSettings {
            max_findings_per_audit: 0,
            ..AuditSettings::default()
        };
        assert!(settings
            .validate()
            .unwrap_err()
            .to_string()
            .contains("max_findings_per_audit"));

        let settings = AuditSettings {
            thresholds: RiskThresholds { yellow: 90, red: 50 },
            ..AuditSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
