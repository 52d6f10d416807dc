// src/services/classify.rs

//! Optional title classification against an external HTTP endpoint.
//!
//! Strictly best-effort: the endpoint may be unset, unreachable, or slow,
//! and none of that affects the harvest or the artifact. Labels are only
//! surfaced in the run log.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::ClassifierConfig;

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    titles: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    labels: Vec<String>,
}

pub struct TitleClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl TitleClassifier {
    /// `None` when no endpoint is configured.
    pub fn from_config(config: &ClassifierConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .ok()?;
        Some(Self { endpoint, client })
    }

    /// Classify a batch of titles; index-aligned with the input.
    pub async fn classify(&self, titles: &[&str]) -> Result<Vec<String>> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&ClassifyRequest {
                titles: titles.to_vec(),
            })
            .send()
            .await?
            .error_for_status()?;
        let body: ClassifyResponse = response.json().await?;
        Ok(body.labels)
    }

    /// Classify and log a label histogram. Failures are logged and swallowed.
    pub async fn summarize(&self, titles: &[&str]) {
        match self.classify(titles).await {
            Ok(labels) => {
                let mut counts: HashMap<&str, usize> = HashMap::new();
                for label in &labels {
                    *counts.entry(label.as_str()).or_default() += 1;
                }
                let mut pairs: Vec<_> = counts.into_iter().collect();
                pairs.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
                for (label, count) in pairs {
                    log::info!("classifier: {label} x{count}");
                }
            }
            Err(error) => log::warn!("classifier unavailable: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_endpoint_disables_classifier() {
        let config = ClassifierConfig::default();
        assert!(TitleClassifier::from_config(&config).is_none());
    }

    #[test]
    fn test_configured_endpoint_builds() {
        let config = ClassifierConfig {
            endpoint: Some("http://localhost:9000/classify".into()),
            timeout_secs: 5,
        };
        assert!(TitleClassifier::from_config(&config).is_some());
    }

    #[test]
    fn test_request_payload_shape() {
        let request = ClassifyRequest {
            titles: vec!["첫 번째", "두 번째"],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["titles"][1], "두 번째");
    }
}
