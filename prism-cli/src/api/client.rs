//! HTTP client for Prism Central
//!
//! Basic auth over TLS; Prism Central commonly runs self-signed certs, so
//! certificate validation can be disabled via the `insecure` config flag.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::ApiCredentials;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one associate-categories call.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub accepted: bool,
    pub status: u16,
}

pub struct PrismClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl PrismClient {
    pub fn new(credentials: &ApiCredentials) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(credentials.insecure)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: credentials.base_url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// GET one page of a list endpoint.
    pub async fn get_page(&self, path: &str, page: usize, limit: usize) -> Result<Value> {
        let url = self.url(path);
        log::debug!("GET {} ($page={}, $limit={})", url, page, limit);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .query(&[("$page", page.to_string()), ("$limit", limit.to_string())])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }

        response
            .json()
            .await
            .with_context(|| format!("GET {} returned invalid JSON", url))
    }

    /// GET a single VM, returning its ETag header and body. The ETag is
    /// required by the associate-categories action for optimistic locking.
    pub async fn get_vm(&self, ext_id: &str) -> Result<(Option<String>, Value)> {
        let url = self.url(&format!("{}/{}", super::VMS_PATH, ext_id));
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }

        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .json()
            .await
            .with_context(|| format!("GET {} returned invalid JSON", url))?;

        Ok((etag, body))
    }

    /// POST the associate-categories action for one VM. The API answers
    /// 202 Accepted on success (the association runs as a background task).
    pub async fn associate_categories(
        &self,
        ext_id: &str,
        etag: &str,
        identifiers: &[String],
    ) -> Result<ApplyOutcome> {
        let url = self.url(&format!(
            "{}/{}/$actions/associate-categories",
            super::VMS_PATH,
            ext_id
        ));
        let payload = categories_payload(identifiers);
        log::debug!("POST {} payload {}", url, payload);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::IF_MATCH, etag)
            .header("NTNX-Request-Id", Uuid::new_v4().to_string())
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::ACCEPTED {
            log::warn!("POST {} returned {}", url, status);
        }

        Ok(ApplyOutcome {
            accepted: status == StatusCode::ACCEPTED,
            status: status.as_u16(),
        })
    }
}

/// Build the associate-categories payload. Blank identifiers are dropped.
pub fn categories_payload(identifiers: &[String]) -> Value {
    let categories: Vec<Value> = identifiers
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| json!({ "extId": id }))
        .collect();
    json!({ "categories": categories })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_wraps_identifiers_as_ext_ids() {
        let payload = categories_payload(&["uuid-1".to_string(), "uuid-2".to_string()]);
        assert_eq!(
            payload,
            serde_json::json!({
                "categories": [{ "extId": "uuid-1" }, { "extId": "uuid-2" }]
            })
        );
    }

    #[test]
    fn payload_drops_blank_identifiers() {
        let payload = categories_payload(&[" ".to_string(), "uuid-1".to_string()]);
        assert_eq!(payload["categories"].as_array().unwrap().len(), 1);
    }
}
