use std::fmt::Write;

use crate::model::{AuditReport, RiskLevel, RiskThresholds};

/// Format styles supported in default reporter implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Produce a report string from an `AuditReport` using the desired format.
///
/// `thresholds` must be the ones the report was graded with so per-category
/// levels agree with the overall level.
pub fn render_report(
    report: &AuditReport,
    format: OutputFormat,
    thresholds: &RiskThresholds,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Human => render_human(report, thresholds),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
    }
}

fn traffic_light(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Green => "[ GREEN  ]",
        RiskLevel::Yellow => "[ YELLOW ]",
        RiskLevel::Red => "[  RED   ]",
    }
}

fn render_human(report: &AuditReport, thresholds: &RiskThresholds) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "Supplier: {}", report.supplier)?;
    writeln!(out, "Audited At: {}", report.timestamp)?;
    writeln!(
        out,
        "Overall Risk: {} {}",
        traffic_light(report.overall_risk),
        report.overall_risk
    )?;
    writeln!(out)?;

    writeln!(out, "Risk Breakdown:")?;
    for (category, score) in report.risk_scores.iter() {
        writeln!(
            out,
            "  - {category:>12}: {score:>3} ({level})",
            category = category.as_str(),
            level = RiskLevel::from_score_with_thresholds(score, thresholds),
        )?;
    }

    writeln!(out)?;
    if report.findings.is_empty() {
        writeln!(out, "No findings reported.")?;
    } else {
        writeln!(out, "Findings ({}):", report.findings.len())?;
        for finding in &report.findings {
            writeln!(
                out,
                "  - [{date}] {category} :: {source}",
                date = finding.date,
                category = finding.category,
                source = finding.source,
            )?;
            writeln!(out, "    \"{}\"", sanitize_snippet(&finding.snippet))?;
            if let Some(url) = &finding.url {
                writeln!(out, "    {url}")?;
            }
        }
    }

    writeln!(out)?;
    if report.violations.is_empty() {
        writeln!(out, "No policy violations detected.")?;
    } else {
        writeln!(out, "Violations ({}):", report.violations.len())?;
        for violation in &report.violations {
            writeln!(
                out,
                "  - {severity} ({evidence}) {category} :: {policy}",
                severity = violation.severity.as_str(),
                evidence = violation.evidence_type.as_str(),
                category = violation.category(),
                policy = violation.policy_reference,
            )?;
            writeln!(
                out,
                "    \"{}\"",
                sanitize_snippet(&violation.finding.snippet)
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Recommendations:")?;
    for recommendation in &report.recommendations {
        writeln!(out, "  - {recommendation}")?;
    }

    Ok(out)
}

fn sanitize_snippet(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            _ => c,
        })
        .collect()
}
