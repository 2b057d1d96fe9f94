use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use super::{InvestigatorResponse, NewsSource};
use crate::model::Finding;
use crate::settings::NewsSettings;

/// News search over HTTP: one GET per audit, fixed timeout, no retries.
///
/// The endpoint receives `?supplier_name=<name>` and must answer with
/// `{"supplier": ..., "findings": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpNewsSource {
    http: Client,
    url: String,
    api_key: Option<String>,
}

impl HttpNewsSource {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        if endpoint.trim().is_empty() {
            bail!("news search endpoint must not be blank");
        }
        let http = Client::builder()
            .user_agent("ethoschain/0.1")
            .timeout(timeout)
            .build()
            .context("failed to build news search HTTP client")?;
        Ok(Self {
            http,
            url: endpoint.trim().to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Build from settings; `None` when no endpoint is configured.
    pub fn from_settings(settings: &NewsSettings) -> Result<Option<Self>> {
        settings
            .endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
            .map(|endpoint| {
                Self::new(
                    endpoint,
                    settings.api_key.clone(),
                    Duration::from_secs(settings.timeout_secs),
                )
            })
            .transpose()
    }
}

#[async_trait]
impl NewsSource for HttpNewsSource {
    async fn search(&self, supplier_name: &str) -> Result<Vec<Finding>> {
        let mut request = self
            .http
            .get(&self.url)
            .query(&[("supplier_name", supplier_name)]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to call news search API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("news search API error ({}): {}", status, body);
        }

        let payload: InvestigatorResponse = response
            .json()
            .await
            .context("failed to parse news search response")?;

        for (idx, finding) in payload.findings.iter().enumerate() {
            finding
                .validate()
                .with_context(|| format!("news search returned invalid finding #{idx}"))?;
        }
        Ok(payload.findings)
    }
}
