use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::Finding;

pub mod http;
pub mod mock;

pub use http::HttpNewsSource;
pub use mock::MockNewsSource;

/// Default cap on findings handed to the auditor per run.
pub const DEFAULT_MAX_FINDINGS: usize = 50;

/// Payload exchanged with news-search backends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigatorResponse {
    pub supplier: String,
    #[serde(default)]
    pub findings: Vec<Finding>,
}

/// Backend that turns a supplier name into news findings.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn search(&self, supplier_name: &str) -> Result<Vec<Finding>>;
}

/// Gathers external intelligence on a supplier.
pub struct Investigator {
    source: Arc<dyn NewsSource>,
    max_findings: usize,
}

impl Investigator {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self::with_limit(source, DEFAULT_MAX_FINDINGS)
    }

    pub fn with_limit(source: Arc<dyn NewsSource>, max_findings: usize) -> Self {
        Self {
            source,
            max_findings,
        }
    }

    pub async fn search(&self, supplier_name: &str) -> Result<Vec<Finding>> {
        let mut findings = self.source.search(supplier_name).await?;
        if findings.len() > self.max_findings {
            warn!(
                returned = findings.len(),
                limit = self.max_findings,
                "truncating findings to configured limit"
            );
            findings.truncate(self.max_findings);
        }
        debug!(findings = findings.len(), "investigation completed");
        Ok(findings)
    }
}
