use std::collections::BTreeMap;

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};
use tracing::trace;

use super::{builtin_rules, PolicyChecker, PolicyRule, PolicyRuleRepository, RuleTier};
use crate::model::{EvidenceType, Finding, Violation};

/// Keywords of one tier compiled into a single automaton.
struct TierMatcher {
    automaton: AhoCorasick,
    rules: Vec<PolicyRule>,
}

impl TierMatcher {
    fn compile(tier: RuleTier, rules: Vec<PolicyRule>) -> Result<Self> {
        let patterns: Vec<_> = rules.iter().map(|rule| rule.keyword.clone()).collect();
        let automaton = AhoCorasick::new(patterns)
            .with_context(|| format!("failed to build keyword automaton for {tier} rules"))?;
        Ok(Self { automaton, rules })
    }

    fn first_match(&self, haystack: &str) -> Option<&PolicyRule> {
        self.automaton
            .find(haystack)
            .and_then(|mat| self.rules.get(mat.pattern().as_usize()))
    }
}

/// Rule-based classifier: ordered keyword tiers, first match wins.
///
/// A snippet that mentions both an exculpatory and a violation keyword is
/// treated as clean because the exculpatory tier is consulted first.
pub struct KeywordPolicyChecker {
    tiers: BTreeMap<RuleTier, TierMatcher>,
}

impl KeywordPolicyChecker {
    pub fn new(rules: Vec<PolicyRule>) -> Result<Self> {
        let mut grouped: BTreeMap<RuleTier, Vec<PolicyRule>> = BTreeMap::new();
        for rule in rules {
            rule.validate()?;
            grouped.entry(rule.tier).or_default().push(rule);
        }
        let mut tiers = BTreeMap::new();
        for (tier, rules) in grouped {
            tiers.insert(tier, TierMatcher::compile(tier, rules)?);
        }
        Ok(Self { tiers })
    }

    /// Classifier over the compiled-in rule table.
    pub fn builtin() -> Result<Self> {
        Self::new(builtin_rules())
    }

    pub async fn from_repository<R>(repo: &R) -> Result<Self>
    where
        R: PolicyRuleRepository + ?Sized,
    {
        let rules = repo
            .load_rules()
            .await
            .context("failed to load policy rules")?;
        Self::new(rules)
    }

    fn matching_rule(&self, tier: RuleTier, haystack: &str) -> Option<&PolicyRule> {
        self.tiers
            .get(&tier)
            .and_then(|matcher| matcher.first_match(haystack))
    }

    /// Judge a single finding against the rule table.
    pub fn classify(&self, finding: &Finding) -> Option<Violation> {
        let snippet = finding.snippet.to_lowercase();

        if let Some(rule) = self.matching_rule(RuleTier::Exculpatory, &snippet) {
            trace!(rule_id = %rule.id, "exculpatory keyword clears finding");
            return None;
        }

        let (rule, severity) = [RuleTier::Critical, RuleTier::Major, RuleTier::Minor]
            .into_iter()
            .find_map(|tier| {
                let rule = self.matching_rule(tier, &snippet)?;
                Some((rule, tier.severity()?))
            })?;

        let evidence_type = if self.matching_rule(RuleTier::Proof, &snippet).is_some() {
            EvidenceType::Proven
        } else {
            EvidenceType::Allegation
        };
        trace!(
            rule_id = %rule.id,
            severity = severity.as_str(),
            evidence = evidence_type.as_str(),
            "finding breaches policy"
        );

        Some(Violation::new(finding.clone(), severity, evidence_type))
    }
}

#[async_trait::async_trait]
impl PolicyChecker for KeywordPolicyChecker {
    async fn check(&self, finding: &Finding) -> Result<Option<Violation>> {
        Ok(self.classify(finding))
    }
}
