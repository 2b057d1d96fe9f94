use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::NewsSource;
use crate::model::{Category, Finding};

const SUPPLIER_PLACEHOLDER: &str = "{supplier}";

struct FindingTemplate {
    date: &'static str,
    source: &'static str,
    snippet: &'static str,
    category: Category,
    url: &'static str,
}

impl FindingTemplate {
    fn render(&self, supplier_name: &str) -> Finding {
        Finding {
            date: self.date.to_string(),
            source: self.source.to_string(),
            snippet: self.snippet.replace(SUPPLIER_PLACEHOLDER, supplier_name),
            category: self.category,
            url: Some(self.url.to_string()),
        }
    }
}

/// Canned result set selected when the supplier name contains one of `markers`.
struct Bucket {
    name: &'static str,
    markers: &'static [&'static str],
    findings: &'static [FindingTemplate],
}

// Checked in order; the first bucket whose marker occurs in the name wins.
const BUCKETS: &[Bucket] = &[
    Bucket {
        name: "red",
        markers: &["problem", "violator", "toxic"],
        findings: &[
            FindingTemplate {
                date: "2024-04-02",
                source: "Labor Rights Watch",
                snippet: "Court confirmed severe labor abuses at {supplier} subcontractor sites.",
                category: Category::Labor,
                url: "https://example.com/news/labor-789",
            },
            FindingTemplate {
                date: "2024-02-18",
                source: "Environmental Justice Daily",
                snippet: "{supplier} faces $3M lawsuit over hazardous waste dumping.",
                category: Category::Environment,
                url: "https://example.com/news/env-321",
            },
            FindingTemplate {
                date: "2023-11-07",
                source: "Financial Times Wire",
                snippet: "Regulators opened an investigation into {supplier} procurement practices.",
                category: Category::Governance,
                url: "https://example.com/news/gov-654",
            },
        ],
    },
    Bucket {
        name: "yellow",
        markers: &["watch", "pending", "mixed"],
        findings: &[
            FindingTemplate {
                date: "2024-05-21",
                source: "Fair Work Monitor",
                snippet: "NGO raises concerns about overtime practices at {supplier} suppliers.",
                category: Category::Labor,
                url: "https://example.com/news/labor-111",
            },
            FindingTemplate {
                date: "2024-03-30",
                source: "Governance Weekly",
                snippet: "Shareholders pose questions over {supplier} board independence.",
                category: Category::Governance,
                url: "https://example.com/news/gov-222",
            },
            FindingTemplate {
                date: "2024-01-09",
                source: "Green Business Journal",
                snippet: "{supplier} publishes first water stewardship disclosure.",
                category: Category::Environment,
                url: "https://example.com/news/env-333",
            },
        ],
    },
    Bucket {
        name: "green",
        markers: &["clean", "green", "ethical"],
        findings: &[
            FindingTemplate {
                date: "2024-06-12",
                source: "Sustainability Today",
                snippet: "{supplier} receives sustainability award for renewable energy adoption.",
                category: Category::Environment,
                url: "https://example.com/news/env-444",
            },
            FindingTemplate {
                date: "2024-04-25",
                source: "Fair Trade Bulletin",
                snippet: "{supplier} maintains fair labor certification across all facilities.",
                category: Category::Labor,
                url: "https://example.com/news/labor-555",
            },
            FindingTemplate {
                date: "2024-02-14",
                source: "Corporate Governance Review",
                snippet: "{supplier} publishes audited annual governance statement.",
                category: Category::Governance,
                url: "https://example.com/news/gov-666",
            },
        ],
    },
];

const GENERIC_FINDINGS: &[FindingTemplate] = &[
    FindingTemplate {
        date: "2024-03-10",
        source: "Global Environmental News",
        snippet: "{supplier} fined $2M for river pollution violations.",
        category: Category::Environment,
        url: "https://example.com/news/env-123",
    },
    FindingTemplate {
        date: "2024-01-15",
        source: "Labor Rights Watch",
        snippet: "Workers at {supplier} factory report unsafe conditions.",
        category: Category::Labor,
        url: "https://example.com/news/labor-456",
    },
];

/// Deterministic stand-in for a news search API.
///
/// Supplier names are matched case-insensitively against marker substrings;
/// names that match no bucket get a generic environmental fine plus a labor
/// report. No I/O, no randomness.
#[derive(Debug, Default, Clone)]
pub struct MockNewsSource;

impl MockNewsSource {
    fn templates_for(supplier_name: &str) -> (&'static str, &'static [FindingTemplate]) {
        let needle = supplier_name.to_lowercase();
        BUCKETS
            .iter()
            .find(|bucket| bucket.markers.iter().any(|marker| needle.contains(marker)))
            .map(|bucket| (bucket.name, bucket.findings))
            .unwrap_or(("generic", GENERIC_FINDINGS))
    }
}

#[async_trait]
impl NewsSource for MockNewsSource {
    async fn search(&self, supplier_name: &str) -> Result<Vec<Finding>> {
        let (bucket, templates) = Self::templates_for(supplier_name);
        debug!(bucket, "serving mock findings");
        Ok(templates
            .iter()
            .map(|template| template.render(supplier_name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auditor::Auditor;
    use crate::model::RiskLevel;
    use crate::policy::keyword_checker::KeywordPolicyChecker;
    use regex::Regex;
    use std::sync::Arc;

    async fn search(name: &str) -> Vec<Finding> {
        MockNewsSource.search(name).await.unwrap()
    }

    async fn risk_for(name: &str) -> RiskLevel {
        let auditor = Auditor::new(Arc::new(KeywordPolicyChecker::builtin().unwrap()));
        auditor.evaluate(&search(name).await).await.unwrap().overall_risk
    }

    #[tokio::test]
    async fn findings_are_well_formed_and_mention_supplier() {
        let date = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
        for name in ["Acme Corp", "CleanCorp Inc", "WatchList Ltd", "ProblemCorp Ltd"] {
            let findings = search(name).await;
            assert!(!findings.is_empty() && findings.len() <= 10);
            assert!(findings.iter().any(|f| f.snippet.contains(name)));
            for finding in &findings {
                finding.validate().unwrap();
                assert!(date.is_match(&finding.date), "bad date {}", finding.date);
                assert!(finding.url.as_deref().unwrap().starts_with("https://"));
            }
        }
    }

    #[tokio::test]
    async fn buckets_carry_their_traffic_light() {
        assert_eq!(risk_for("CleanCorp Inc").await, RiskLevel::Green);
        assert_eq!(risk_for("Ethical Textiles").await, RiskLevel::Green);
        assert_eq!(risk_for("Pending Review Co").await, RiskLevel::Yellow);
        assert_eq!(risk_for("ProblemCorp Ltd").await, RiskLevel::Red);
        assert_eq!(risk_for("Violator Corp").await, RiskLevel::Red);
    }

    #[tokio::test]
    async fn unmatched_names_get_generic_findings() {
        let findings = search("Acme Corporation").await;
        assert_eq!(findings.len(), 2);
        assert_eq!(
            findings[0].snippet,
            "Acme Corporation fined $2M for river pollution violations."
        );
        assert_eq!(findings[1].category, Category::Labor);
        assert_eq!(risk_for("Acme Corporation").await, RiskLevel::Red);
    }

    #[tokio::test]
    async fn red_markers_take_precedence() {
        let findings = search("Clean Toxic Holdings").await;
        assert!(findings[0].snippet.contains("severe labor abuses"));
    }

    #[tokio::test]
    async fn special_characters_are_preserved() {
        for name in ["Corp & Co.", "Test-Corp", "Corp's Inc.", "Corp (Holdings)", ""] {
            let findings = search(name).await;
            assert_eq!(findings.len(), GENERIC_FINDINGS.len());
            assert!(findings[0].snippet.contains(name));
        }
    }
}
