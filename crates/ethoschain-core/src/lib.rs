pub mod auditor;
pub mod error;
pub mod handler;
pub mod investigator;
pub mod model;
pub mod policy;
pub mod report;
pub mod settings;
pub mod supervisor;

pub use auditor::{aggregate, recommend, AuditOutcome, Auditor};
pub use error::AuditError;
pub use handler::{handle_event, Envelope};
pub use investigator::{HttpNewsSource, Investigator, MockNewsSource, NewsSource};
pub use model::{
    AuditReport, Category, EvidenceType, Finding, FindingValidationError, RiskLevel, RiskScores,
    RiskThresholds, Severity, Violation,
};
pub use policy::{
    builtin_rules, file_repository::FileRuleRepository, keyword_checker::KeywordPolicyChecker,
    BuiltinRuleRepository, PolicyChecker, PolicyRule, PolicyRuleRepository, RuleTier,
    RuleValidationError,
};
pub use report::{render_report, OutputFormat};
pub use settings::{AuditSettings, NewsSettings};
pub use supervisor::{AuditQuery, Supervisor};
