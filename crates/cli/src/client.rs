//! API client for the monitor daemon

use anyhow::{Context, Result};
use monitor_lib::collector::StatusSnapshot;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// API client for a running `skynotify` daemon
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        response.json().await.context("Failed to parse response")
    }

    /// Latest analysis and retained alerts
    pub async fn status(&self) -> Result<StatusSnapshot> {
        self.get("status").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_lib::{GlobalStatus, Resource};

    #[test]
    fn test_invalid_url_rejected() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_status_parses_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/status")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "analysis": {
                        "generated_at": "2024-01-01T08:00:00Z",
                        "resources": {
                            "cpu": {
                                "current": 91.0,
                                "trend": "increasing",
                                "anomaly": { "spike": false, "breach": "critical" }
                            }
                        },
                        "status": "critical",
                        "cause": "cpu"
                    },
                    "alerts": []
                }"#,
            )
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let snapshot = client.status().await.unwrap();

        mock.assert_async().await;
        let analysis = snapshot.analysis.unwrap();
        assert_eq!(analysis.status, GlobalStatus::Critical);
        assert_eq!(analysis.cause, Some(Resource::Cpu));
        assert_eq!(analysis.current(Resource::Cpu), Some(91.0));
        assert!(snapshot.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/status")
            .with_status(503)
            .with_body("starting")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url()).unwrap();
        let err = client.status().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
