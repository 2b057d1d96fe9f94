use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Audit category a finding is filed under.
///
/// Findings that arrive without a category are treated as governance issues.
/// Deserialization accepts any letter case, like the CLI flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    Labor,
    Environment,
    #[default]
    Governance,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Labor, Category::Environment, Category::Governance];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Labor => "Labor",
            Self::Environment => "Environment",
            Self::Governance => "Governance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                format!("unknown category `{value}` (expected Labor, Environment or Governance)")
            })
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// How serious a policy breach is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// Points a violation of this severity contributes to its category score.
    pub fn points(self) -> u8 {
        match self {
            Self::Minor => 30,
            Self::Major => 70,
            Self::Critical => 100,
        }
    }

    /// Code of Conduct section cited for violations of this severity.
    pub fn policy_reference(self) -> &'static str {
        match self {
            Self::Critical => "Section 2.1: Critical Violations - Zero Tolerance",
            Self::Major => "Section 3.2: Environmental and Labor Standards",
            Self::Minor => "Section 4.1: Monitoring and Improvement",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::Critical => "CRITICAL",
        }
    }
}

/// Confidence in the evidence behind a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EvidenceType {
    Proven,
    Allegation,
}

impl EvidenceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Proven => "PROVEN",
            Self::Allegation => "ALLEGATION",
        }
    }
}

/// Traffic-light summary of a supplier audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Green,
    Yellow,
    Red,
}

impl RiskLevel {
    /// Map the worst category score into a level using default thresholds.
    pub fn from_score(score: u8) -> Self {
        Self::from_score_with_thresholds(score, &RiskThresholds::default())
    }

    /// Map the worst category score using caller-provided thresholds.
    pub fn from_score_with_thresholds(score: u8, thresholds: &RiskThresholds) -> Self {
        if score >= thresholds.red {
            Self::Red
        } else if score >= thresholds.yellow {
            Self::Yellow
        } else {
            Self::Green
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "GREEN",
            Self::Yellow => "YELLOW",
            Self::Red => "RED",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score cut-offs separating GREEN, YELLOW and RED.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub yellow: u8,
    pub red: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { yellow: 30, red: 70 }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), ThresholdValidationError> {
        if self.red > 100 {
            return Err(ThresholdValidationError::OutOfRange { red: self.red });
        }
        if self.yellow > self.red {
            return Err(ThresholdValidationError::Inverted {
                yellow: self.yellow,
                red: self.red,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThresholdValidationError {
    #[error("red threshold must be within 0..=100 (got {red})")]
    OutOfRange { red: u8 },
    #[error("yellow threshold ({yellow}) must not exceed red threshold ({red})")]
    Inverted { yellow: u8, red: u8 },
}

/// A single reported fact about a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Publication date, ISO `YYYY-MM-DD` when the source provides one.
    pub date: String,
    pub source: String,
    pub snippet: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub url: Option<String>,
}

impl Finding {
    /// Reject findings with blank text fields or non-HTTP URLs.
    pub fn validate(&self) -> Result<(), FindingValidationError> {
        for (field, value) in [
            ("date", &self.date),
            ("source", &self.source),
            ("snippet", &self.snippet),
        ] {
            if value.trim().is_empty() {
                return Err(FindingValidationError::BlankField { field });
            }
        }
        if let Some(url) = &self.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(FindingValidationError::InvalidUrl { url: url.clone() });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FindingValidationError {
    #[error("finding field `{field}` must not be blank")]
    BlankField { field: &'static str },
    #[error("finding url `{url}` must start with http:// or https://")]
    InvalidUrl { url: String },
}

/// A finding judged to breach policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub finding: Finding,
    pub severity: Severity,
    pub policy_reference: String,
    pub evidence_type: EvidenceType,
}

impl Violation {
    pub fn new(finding: Finding, severity: Severity, evidence_type: EvidenceType) -> Self {
        Self {
            finding,
            severity,
            policy_reference: severity.policy_reference().to_string(),
            evidence_type,
        }
    }

    pub fn category(&self) -> Category {
        self.finding.category
    }
}

/// Per-category risk, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    #[serde(rename = "Labor", default, deserialize_with = "bounded_score")]
    pub labor: u8,
    #[serde(rename = "Environment", default, deserialize_with = "bounded_score")]
    pub environment: u8,
    #[serde(rename = "Governance", default, deserialize_with = "bounded_score")]
    pub governance: u8,
}

fn bounded_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let score = u8::deserialize(deserializer)?;
    if score > 100 {
        return Err(de::Error::custom(format!("risk score {score} is outside 0..=100")));
    }
    Ok(score)
}

impl RiskScores {
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Labor => self.labor,
            Category::Environment => self.environment,
            Category::Governance => self.governance,
        }
    }

    /// Keep the larger of the current score and `points`.
    pub fn raise(&mut self, category: Category, points: u8) {
        let slot = match category {
            Category::Labor => &mut self.labor,
            Category::Environment => &mut self.environment,
            Category::Governance => &mut self.governance,
        };
        *slot = (*slot).max(points.min(100));
    }

    /// Worst score across all categories.
    pub fn max(&self) -> u8 {
        self.labor.max(self.environment).max(self.governance)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u8)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

/// Complete audit result for one supplier; the interchange format of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditReport {
    pub supplier: String,
    /// RFC 3339 UTC time the audit ran.
    pub timestamp: String,
    pub overall_risk: RiskLevel,
    pub risk_scores: RiskScores,
    pub findings: Vec<Finding>,
    pub violations: Vec<Violation>,
    pub recommendations: Vec<String>,
}

impl AuditReport {
    pub fn has_critical_violations(&self) -> bool {
        self.violations
            .iter()
            .any(|violation| violation.severity == Severity::Critical)
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}
