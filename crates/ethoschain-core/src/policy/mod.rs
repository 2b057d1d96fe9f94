use std::fmt;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Finding, Severity, Violation};

pub mod file_repository;
pub mod keyword_checker;

/// Position of a keyword in the ordered rule table.
///
/// Tiers are evaluated in declaration order and the first tier with a match
/// decides the outcome; `Proof` is consulted separately for evidence type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTier {
    /// Positive coverage (awards, certifications) that clears the finding.
    Exculpatory,
    Critical,
    Major,
    Minor,
    /// Words indicating the breach is established rather than alleged.
    Proof,
}

impl RuleTier {
    pub const ALL: [RuleTier; 5] = [
        RuleTier::Exculpatory,
        RuleTier::Critical,
        RuleTier::Major,
        RuleTier::Minor,
        RuleTier::Proof,
    ];

    /// Severity assigned when this tier decides a finding.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Critical => Some(Severity::Critical),
            Self::Major => Some(Severity::Major),
            Self::Minor => Some(Severity::Minor),
            Self::Exculpatory | Self::Proof => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exculpatory => "exculpatory",
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Proof => "proof",
        }
    }
}

impl fmt::Display for RuleTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuleTier {
    type Err = RuleValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        RuleTier::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| RuleValidationError::UnknownTier {
                tier: needle.to_string(),
            })
    }
}

/// A single keyword in the policy rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// Unique identifier (namespaced by tier, e.g. `MAJOR_FINED`).
    pub id: String,
    pub tier: RuleTier,
    /// Lower-case substring matched against the lower-cased snippet.
    pub keyword: String,
}

impl PolicyRule {
    /// Construct a rule, lower-casing the keyword and validating invariants.
    pub fn new(
        id: impl Into<String>,
        tier: RuleTier,
        keyword: impl Into<String>,
    ) -> Result<Self, RuleValidationError> {
        let rule = Self {
            id: id.into(),
            tier,
            keyword: keyword.into().to_lowercase(),
        };
        rule.validate()?;
        Ok(rule)
    }

    pub fn validate(&self) -> Result<(), RuleValidationError> {
        if self.id.trim().is_empty() {
            return Err(RuleValidationError::EmptyId);
        }
        if self.keyword.trim().is_empty() {
            return Err(RuleValidationError::EmptyKeyword {
                rule_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Errors emitted while validating rule definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleValidationError {
    #[error("rule id must not be blank")]
    EmptyId,
    #[error("rule `{rule_id}` keyword must not be empty")]
    EmptyKeyword { rule_id: String },
    #[error("unknown rule tier `{tier}` (expected exculpatory, critical, major, minor or proof)")]
    UnknownTier { tier: String },
}

const BUILTIN_RULES: &[(&str, RuleTier, &str)] = &[
    ("EXCUL_AWARD", RuleTier::Exculpatory, "award"),
    ("EXCUL_CERTIFICATION", RuleTier::Exculpatory, "certification"),
    ("EXCUL_CERTIFIED", RuleTier::Exculpatory, "certified"),
    ("EXCUL_MAINTAINS", RuleTier::Exculpatory, "maintains"),
    ("EXCUL_RECEIVES", RuleTier::Exculpatory, "receives"),
    ("CRIT_CRITICAL", RuleTier::Critical, "critical"),
    ("CRIT_SEVERE", RuleTier::Critical, "severe"),
    ("CRIT_FINE_3M", RuleTier::Critical, "$3m"),
    ("CRIT_HAZARDOUS", RuleTier::Critical, "hazardous"),
    ("CRIT_LAWSUIT", RuleTier::Critical, "lawsuit"),
    ("CRIT_ABUSES", RuleTier::Critical, "abuses"),
    ("MAJOR_FINED", RuleTier::Major, "fined"),
    ("MAJOR_VIOLATION", RuleTier::Major, "violation"),
    ("MAJOR_INVESTIGATION", RuleTier::Major, "investigation"),
    ("MAJOR_CONTAMINATION", RuleTier::Major, "contamination"),
    ("MINOR_CONCERNS", RuleTier::Minor, "concerns"),
    ("MINOR_QUESTIONS", RuleTier::Minor, "questions"),
    ("MINOR_ALLEGATIONS", RuleTier::Minor, "allegations"),
    ("MINOR_ACCUSED", RuleTier::Minor, "accused"),
    ("MINOR_REPORT", RuleTier::Minor, "report"),
    ("PROOF_FINED", RuleTier::Proof, "fined"),
    ("PROOF_FOUND", RuleTier::Proof, "found"),
    ("PROOF_CONFIRMED", RuleTier::Proof, "confirmed"),
];

/// The default Code of Conduct keyword table.
pub fn builtin_rules() -> Vec<PolicyRule> {
    BUILTIN_RULES
        .iter()
        .map(|(id, tier, keyword)| PolicyRule {
            id: (*id).to_string(),
            tier: *tier,
            keyword: (*keyword).to_string(),
        })
        .collect()
}

/// Abstraction over rule loading so the table can come from code, files or a remote store.
#[async_trait]
pub trait PolicyRuleRepository: Send + Sync {
    /// Retrieve the full rule set currently active, in table order.
    async fn load_rules(&self) -> AnyResult<Vec<PolicyRule>>;

    /// Fetch a single rule by identifier if it exists.
    async fn get_rule(&self, rule_id: &str) -> AnyResult<Option<PolicyRule>> {
        let rules = self.load_rules().await?;
        Ok(rules.into_iter().find(|rule| rule.id == rule_id))
    }
}

/// Serves the compiled-in rule table.
#[derive(Debug, Default, Clone)]
pub struct BuiltinRuleRepository;

#[async_trait]
impl PolicyRuleRepository for BuiltinRuleRepository {
    async fn load_rules(&self) -> AnyResult<Vec<PolicyRule>> {
        Ok(builtin_rules())
    }
}

/// Decides whether a finding breaches policy.
///
/// The keyword classifier is the only implementation today; a retrieval-backed
/// checker can satisfy the same contract without touching aggregation.
#[async_trait]
pub trait PolicyChecker: Send + Sync {
    /// Return the violation this finding represents, or `None` when it is clean.
    async fn check(&self, finding: &Finding) -> AnyResult<Option<Violation>>;
}
