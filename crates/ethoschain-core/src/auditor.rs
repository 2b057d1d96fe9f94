use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::{
    EvidenceType, Finding, RiskLevel, RiskScores, RiskThresholds, Severity, Violation,
};
use crate::policy::PolicyChecker;

pub const NO_ACTION: &str = "No immediate action required. Continue monitoring.";
pub const URGENT_AUDIT: &str = "URGENT: Conduct immediate audit of supplier operations";
pub const REMEDIATION_PLAN: &str = "Request supplier remediation plan with timeline";
pub const FOLLOW_UP: &str = "Schedule follow-up review in 30 days";

/// Everything the auditor derives from a list of findings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub overall_risk: RiskLevel,
    pub risk_scores: RiskScores,
    pub violations: Vec<Violation>,
    pub recommendations: Vec<String>,
}

/// Applies the policy checker to findings and scores the result.
pub struct Auditor {
    checker: Arc<dyn PolicyChecker>,
    thresholds: RiskThresholds,
}

impl Auditor {
    pub fn new(checker: Arc<dyn PolicyChecker>) -> Self {
        Self::with_thresholds(checker, RiskThresholds::default())
    }

    pub fn with_thresholds(checker: Arc<dyn PolicyChecker>, thresholds: RiskThresholds) -> Self {
        Self {
            checker,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    #[instrument(name = "evaluate_findings", skip_all, fields(findings = findings.len()))]
    pub async fn evaluate(&self, findings: &[Finding]) -> Result<AuditOutcome> {
        let mut violations = Vec::new();
        for (idx, finding) in findings.iter().enumerate() {
            let verdict = self
                .checker
                .check(finding)
                .await
                .with_context(|| format!("policy check failed for finding #{idx}"))?;
            if let Some(violation) = verdict {
                violations.push(violation);
            }
        }

        let (risk_scores, overall_risk) = aggregate(&violations, &self.thresholds);
        let recommendations = recommend(&violations);
        debug!(
            violations = violations.len(),
            overall = overall_risk.as_str(),
            "audit evaluated"
        );

        Ok(AuditOutcome {
            overall_risk,
            risk_scores,
            violations,
            recommendations,
        })
    }
}

/// Max-reduce severity points per category, then classify the worst score.
pub fn aggregate(violations: &[Violation], thresholds: &RiskThresholds) -> (RiskScores, RiskLevel) {
    let mut scores = RiskScores::default();
    for violation in violations {
        scores.raise(violation.category(), violation.severity.points());
    }
    let level = RiskLevel::from_score_with_thresholds(scores.max(), thresholds);
    (scores, level)
}

/// Canned follow-up actions for a set of violations.
pub fn recommend(violations: &[Violation]) -> Vec<String> {
    if violations.is_empty() {
        return vec![NO_ACTION.to_string()];
    }

    let mut recommendations = Vec::new();
    if violations
        .iter()
        .any(|violation| violation.severity == Severity::Critical)
    {
        recommendations.push(URGENT_AUDIT.to_string());
    }
    if violations
        .iter()
        .any(|violation| violation.evidence_type == EvidenceType::Proven)
    {
        recommendations.push(REMEDIATION_PLAN.to_string());
    }
    recommendations.push(FOLLOW_UP.to_string());
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use crate::policy::keyword_checker::KeywordPolicyChecker;
    use proptest::prelude::*;

    fn finding(snippet: &str, category: Category) -> Finding {
        Finding {
            date: "2024-03-10".into(),
            source: "EPA".into(),
            snippet: snippet.into(),
            category,
            url: None,
        }
    }

    fn violation(category: Category, severity: Severity, evidence: EvidenceType) -> Violation {
        Violation::new(finding("placeholder", category), severity, evidence)
    }

    fn auditor() -> Auditor {
        Auditor::new(Arc::new(KeywordPolicyChecker::builtin().unwrap()))
    }

    #[tokio::test]
    async fn empty_findings_are_green_with_no_action() {
        let outcome = auditor().evaluate(&[]).await.unwrap();
        assert_eq!(outcome.overall_risk, RiskLevel::Green);
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.risk_scores, RiskScores::default());
        assert_eq!(outcome.recommendations, vec![NO_ACTION.to_string()]);
    }

    #[tokio::test]
    async fn pollution_fine_scores_environment() {
        let outcome = auditor()
            .evaluate(&[finding(
                "fined for pollution violations",
                Category::Environment,
            )])
            .await
            .unwrap();
        assert_eq!(outcome.violations.len(), 1);
        assert_eq!(outcome.violations[0].severity, Severity::Major);
        assert_eq!(outcome.violations[0].evidence_type, EvidenceType::Proven);
        assert_eq!(outcome.risk_scores.environment, 70);
        assert_eq!(outcome.risk_scores.labor, 0);
        assert_eq!(outcome.overall_risk, RiskLevel::Red);
        assert_eq!(
            outcome.recommendations,
            vec![REMEDIATION_PLAN.to_string(), FOLLOW_UP.to_string()]
        );
    }

    #[tokio::test]
    async fn clean_findings_produce_no_violations() {
        let outcome = auditor()
            .evaluate(&[
                finding("receives sustainability award", Category::Labor),
                finding("Opens a new plant", Category::Governance),
            ])
            .await
            .unwrap();
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.overall_risk, RiskLevel::Green);
    }

    #[tokio::test]
    async fn thresholds_are_configurable() {
        let auditor = Auditor::with_thresholds(
            Arc::new(KeywordPolicyChecker::builtin().unwrap()),
            RiskThresholds { yellow: 30, red: 80 },
        );
        let outcome = auditor
            .evaluate(&[finding("Company fined $1M", Category::Governance)])
            .await
            .unwrap();
        assert_eq!(outcome.risk_scores.governance, 70);
        assert_eq!(outcome.overall_risk, RiskLevel::Yellow);
    }

    #[test]
    fn aggregate_takes_max_per_category() {
        let violations = vec![
            violation(Category::Labor, Severity::Minor, EvidenceType::Allegation),
            violation(Category::Labor, Severity::Critical, EvidenceType::Allegation),
            violation(Category::Labor, Severity::Major, EvidenceType::Proven),
            violation(Category::Governance, Severity::Minor, EvidenceType::Allegation),
        ];
        let (scores, level) = aggregate(&violations, &RiskThresholds::default());
        assert_eq!(scores.labor, 100);
        assert_eq!(scores.environment, 0);
        assert_eq!(scores.governance, 30);
        assert_eq!(level, RiskLevel::Red);
    }

    #[test]
    fn minor_only_is_yellow() {
        let violations = vec![violation(
            Category::Labor,
            Severity::Minor,
            EvidenceType::Allegation,
        )];
        let (_, level) = aggregate(&violations, &RiskThresholds::default());
        assert_eq!(level, RiskLevel::Yellow);
        assert_eq!(recommend(&violations), vec![FOLLOW_UP.to_string()]);
    }

    #[test]
    fn critical_violation_triggers_urgent_first() {
        let violations = vec![
            violation(Category::Labor, Severity::Critical, EvidenceType::Proven),
            violation(Category::Environment, Severity::Minor, EvidenceType::Allegation),
        ];
        assert_eq!(
            recommend(&violations),
            vec![
                URGENT_AUDIT.to_string(),
                REMEDIATION_PLAN.to_string(),
                FOLLOW_UP.to_string()
            ]
        );
    }

    fn any_violation() -> impl Strategy<Value = Violation> {
        (
            proptest::sample::select(Category::ALL.to_vec()),
            proptest::sample::select(vec![Severity::Minor, Severity::Major, Severity::Critical]),
            proptest::bool::ANY,
        )
            .prop_map(|(category, severity, proven)| {
                let evidence = if proven {
                    EvidenceType::Proven
                } else {
                    EvidenceType::Allegation
                };
                violation(category, severity, evidence)
            })
    }

    proptest! {
        #[test]
        fn overall_risk_follows_worst_score(
            violations in proptest::collection::vec(any_violation(), 0..24)
        ) {
            let (scores, level) = aggregate(&violations, &RiskThresholds::default());
            for (category, score) in scores.iter() {
                prop_assert!(score <= 100);
                let expected = violations
                    .iter()
                    .filter(|v| v.category() == category)
                    .map(|v| v.severity.points())
                    .max()
                    .unwrap_or(0);
                prop_assert_eq!(score, expected);
            }
            let worst = scores.max();
            let expected = if worst >= 70 {
                RiskLevel::Red
            } else if worst >= 30 {
                RiskLevel::Yellow
            } else {
                RiskLevel::Green
            };
            prop_assert_eq!(level, expected);
        }

        #[test]
        fn recommendations_track_critical_and_proven(
            violations in proptest::collection::vec(any_violation(), 0..24)
        ) {
            let recommendations = recommend(&violations);
            prop_assert!(!recommendations.is_empty());
            let has_urgent = recommendations.iter().any(|r| r.starts_with("URGENT"));
            let has_remediation = recommendations.iter().any(|r| r.contains("remediation"));
            prop_assert_eq!(
                has_urgent,
                violations.iter().any(|v| v.severity == Severity::Critical)
            );
            prop_assert_eq!(
                has_remediation,
                violations.iter().any(|v| v.evidence_type == EvidenceType::Proven)
            );
            if violations.is_empty() {
                prop_assert_eq!(recommendations, vec![NO_ACTION.to_string()]);
            }
        }
    }
}
