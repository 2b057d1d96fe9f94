use std::{sync::Arc, time::SystemTime};

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::auditor::Auditor;
use crate::error::AuditError;
use crate::investigator::{HttpNewsSource, Investigator, MockNewsSource, NewsSource};
use crate::model::{AuditReport, Category, Finding, RiskThresholds};
use crate::policy::file_repository::FileRuleRepository;
use crate::policy::keyword_checker::KeywordPolicyChecker;
use crate::policy::{BuiltinRuleRepository, PolicyRuleRepository};
use crate::settings::AuditSettings;

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap());

/// One audit request: the supplier plus optional finding filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditQuery {
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub category: Option<Category>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_from: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_to: Option<String>,
}

impl AuditQuery {
    pub fn new(supplier_name: impl Into<String>) -> Self {
        Self {
            supplier_name: supplier_name.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), AuditError> {
        if self.supplier_name.trim().is_empty() {
            return Err(AuditError::MissingParameter("supplier_name"));
        }
        for (name, value) in [("date_from", &self.date_from), ("date_to", &self.date_to)] {
            if let Some(value) = value {
                if value.len() != 10 || !ISO_DATE.is_match(value) {
                    return Err(AuditError::invalid(
                        name,
                        format!("expected YYYY-MM-DD, got `{value}`"),
                    ));
                }
                humantime::parse_rfc3339(&format!("{value}T00:00:00Z")).map_err(|err| {
                    AuditError::invalid(name, format!("`{value}` is not a calendar date: {err}"))
                })?;
            }
        }
        if let (Some(from), Some(to)) = (&self.date_from, &self.date_to) {
            if from > to {
                return Err(AuditError::invalid(
                    "date_from",
                    format!("{from} is after date_to {to}"),
                ));
            }
        }
        Ok(())
    }

    /// Findings with a non-ISO date are never excluded by the date range.
    fn admits(&self, finding: &Finding) -> bool {
        if self
            .category
            .is_some_and(|category| category != finding.category)
        {
            return false;
        }
        if !ISO_DATE.is_match(&finding.date) {
            return true;
        }
        let day = &finding.date[..10];
        let after_start = self.date_from.as_deref().map_or(true, |from| day >= from);
        let before_end = self.date_to.as_deref().map_or(true, |to| day <= to);
        after_start && before_end
    }
}

/// Runs the investigator and the auditor in sequence and merges their output.
pub struct Supervisor {
    investigator: Investigator,
    auditor: Auditor,
}

impl Supervisor {
    pub fn new(investigator: Investigator, auditor: Auditor) -> Self {
        Self {
            investigator,
            auditor,
        }
    }

    /// Wire collaborators from explicit settings.
    pub async fn from_settings(settings: &AuditSettings) -> anyhow::Result<Self> {
        settings.validate().context("invalid audit settings")?;

        let repo: Box<dyn PolicyRuleRepository> = match &settings.rules_dir {
            Some(dir) => Box::new(FileRuleRepository::new(dir)),
            None => Box::new(BuiltinRuleRepository),
        };
        let checker = KeywordPolicyChecker::from_repository(repo.as_ref()).await?;

        let source: Arc<dyn NewsSource> = match HttpNewsSource::from_settings(&settings.news)? {
            Some(http) => Arc::new(http),
            None => Arc::new(MockNewsSource),
        };

        Ok(Self::new(
            Investigator::with_limit(source, settings.max_findings_per_audit),
            Auditor::with_thresholds(Arc::new(checker), settings.thresholds.clone()),
        ))
    }

    /// Thresholds the auditor grades scores against.
    pub fn thresholds(&self) -> &RiskThresholds {
        self.auditor.thresholds()
    }

    pub async fn audit(&self, supplier_name: &str) -> Result<AuditReport, AuditError> {
        self.audit_query(&AuditQuery::new(supplier_name)).await
    }

    pub async fn audit_query(&self, query: &AuditQuery) -> Result<AuditReport, AuditError> {
        self.audit_at(query, SystemTime::now()).await
    }

    /// Audit with an explicit report time.
    #[instrument(name = "audit_supplier", skip_all, fields(supplier = %query.supplier_name))]
    pub async fn audit_at(
        &self,
        query: &AuditQuery,
        at: SystemTime,
    ) -> Result<AuditReport, AuditError> {
        query.validate()?;

        let findings: Vec<Finding> = self
            .investigator
            .search(&query.supplier_name)
            .await
            .map_err(AuditError::Investigation)?
            .into_iter()
            .filter(|finding| query.admits(finding))
            .collect();

        let outcome = self
            .auditor
            .evaluate(&findings)
            .await
            .map_err(AuditError::Evaluation)?;

        info!(
            findings = findings.len(),
            violations = outcome.violations.len(),
            overall = outcome.overall_risk.as_str(),
            "audit completed"
        );

        Ok(AuditReport {
            supplier: query.supplier_name.clone(),
            timestamp: humantime::format_rfc3339_seconds(at).to_string(),
            overall_risk: outcome.overall_risk,
            risk_scores: outcome.risk_scores,
            findings,
            violations: outcome.violations,
            recommendations: outcome.recommendations,
        })
    }
}
