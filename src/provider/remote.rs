//! Remote inference provider
//!
//! One `POST` per prediction, no retries. The client timeout bounds the whole
//! exchange, body included.

use crate::error::RequestError;
use crate::recommendation::Prediction;
use crate::sample::SoilWeatherSample;
use crate::wire::{parse_response, to_wire, WireFieldMap};
use anyhow::Context;
use reqwest::{Client, Url};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RemoteService {
    client: Client,
    endpoint: Url,
    fields: WireFieldMap,
    timeout: Duration,
}

impl RemoteService {
    pub fn new(endpoint: &str, fields: WireFieldMap, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid recommendation endpoint: {}", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Recommendation endpoint must be http(s): {}", endpoint);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crop_recommender/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint,
            fields,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn fields(&self) -> &WireFieldMap {
        &self.fields
    }

    pub async fn predict(&self, sample: &SoilWeatherSample) -> Result<Prediction, RequestError> {
        let body = to_wire(sample, &self.fields);
        tracing::debug!("POST {} with {} fields", self.endpoint, body.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| self.transport_error(e))?;

        parse_response(status, &bytes)
    }

    fn transport_error(&self, err: reqwest::Error) -> RequestError {
        if err.is_timeout() {
            RequestError::Timeout(self.timeout)
        } else {
            RequestError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleField;

    #[test]
    fn test_rejects_bad_endpoints() {
        for endpoint in ["not a url", "ftp://example.com/recommend"] {
            let result = RemoteService::new(endpoint, WireFieldMap::identity(), DEFAULT_TIMEOUT);
            assert!(result.is_err(), "{} should be rejected", endpoint);
        }
    }

    #[test]
    fn test_accepts_http_endpoint() {
        let remote = RemoteService::new(
            "https://example.com/recommend",
            WireFieldMap::identity(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(remote.endpoint().path(), "/recommend");
        assert!(remote.fields().overrides().is_empty());
    }

    #[test]
    fn test_keeps_wire_mapping() {
        let fields = WireFieldMap::parse("temperature=temp").unwrap();
        let remote =
            RemoteService::new("http://127.0.0.1:8000/predict", fields, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(remote.fields().wire_name(SampleField::Temperature), "temp");
        assert_eq!(remote.fields().wire_name(SampleField::Ph), "ph");
    }
}
