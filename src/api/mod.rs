//! HTTP client for the sentiment API server.
//!
//! The server does all the heavy lifting; this client only fetches the
//! precomputed results: the blended score, the component breakdown, server
//! health, and an explicit recompute request.

use crate::config::ApiConfig;
use crate::utils::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use url::Url;

/// Client for the sentiment API server
pub struct SentimentApiClient {
    client: Client,
    sentiment_url: String,
    components_url: String,
    health_url: String,
    refresh_url: String,
}

/// Result of a successful blended-score fetch
#[derive(Debug, Clone)]
pub struct SentimentSnapshot {
    /// Blended score in [-100, 100]
    pub final_score: f64,
    /// Qualitative reading supplied by the server (e.g. "Bullish")
    pub interpretation: String,
}

/// One entry of the component breakdown, as published by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    /// Display label, e.g. "News Sentiment" or "Put Call Ratio"
    pub name: String,
    /// Component score in [-100, 100]
    pub score: f64,
    /// Blend weight in percent, when the server includes it
    #[serde(default)]
    pub weight: Option<f64>,
}

/// Result of a successful component-breakdown fetch
#[derive(Debug, Clone)]
pub struct ComponentsSnapshot {
    pub components: Vec<ComponentEntry>,
    pub final_score: f64,
}

/// Server health report
#[derive(Debug, Clone, Deserialize)]
pub struct ServerHealth {
    pub status: String,
    pub timestamp: String,
    pub cache: ServerCacheStatus,
}

/// Server-side cache state included in the health report
#[derive(Debug, Clone, Deserialize)]
pub struct ServerCacheStatus {
    pub has_data: bool,
    #[serde(default)]
    pub last_updated: Option<String>,
    pub updating: bool,
}

/// Acknowledgement for a forced server-side recompute
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshAck {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    success: bool,
    #[serde(default)]
    data: Option<SentimentData>,
}

#[derive(Debug, Deserialize)]
struct SentimentData {
    final_score: f64,
    interpretation: String,
}

#[derive(Debug, Deserialize)]
struct ComponentsResponse {
    success: bool,
    #[serde(default)]
    components: Option<Vec<ComponentEntry>>,
    #[serde(default)]
    final_score: Option<f64>,
}

impl SentimentResponse {
    fn into_snapshot(self) -> Result<SentimentSnapshot> {
        if !self.success {
            return Err(Error::DataError("API returned unsuccessful response".to_string()));
        }
        let data = self
            .data
            .ok_or_else(|| Error::DataError("response is missing the data object".to_string()))?;
        Ok(SentimentSnapshot {
            final_score: data.final_score,
            interpretation: data.interpretation,
        })
    }
}

impl ComponentsResponse {
    fn into_snapshot(self) -> Result<ComponentsSnapshot> {
        if !self.success {
            return Err(Error::DataError("API returned unsuccessful response".to_string()));
        }
        let components = self
            .components
            .ok_or_else(|| Error::DataError("response is missing components".to_string()))?;
        let final_score = self
            .final_score
            .ok_or_else(|| Error::DataError("response is missing final_score".to_string()))?;
        Ok(ComponentsSnapshot { components, final_score })
    }
}

impl SentimentApiClient {
    /// Create a new client with the configured endpoints and timeout
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Error::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            sentiment_url: config.sentiment_url.clone(),
            components_url: config.components_url.clone(),
            health_url: derive_health_url(&config.sentiment_url)?,
            refresh_url: derive_refresh_url(&config.sentiment_url),
        })
    }

    /// Fetch the blended sentiment score
    pub async fn fetch_sentiment(&self) -> Result<SentimentSnapshot> {
        let response = self.client.get(&self.sentiment_url).send().await?;
        response.error_for_status_ref()?;
        let body = response.json::<SentimentResponse>().await?;
        body.into_snapshot()
    }

    /// Fetch the component breakdown
    pub async fn fetch_components(&self) -> Result<ComponentsSnapshot> {
        let response = self.client.get(&self.components_url).send().await?;
        response.error_for_status_ref()?;
        let body = response.json::<ComponentsResponse>().await?;
        body.into_snapshot()
    }

    /// Query the server's health endpoint
    pub async fn health(&self) -> Result<ServerHealth> {
        let response = self.client.get(&self.health_url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.json::<ServerHealth>().await?)
    }

    /// Ask the server to recompute its score now. The server rate-limits
    /// forced refreshes; a 429 is surfaced with the server's own message.
    pub async fn force_refresh(&self) -> Result<RefreshAck> {
        let response = self.client.post(&self.refresh_url).send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let message = response
                .json::<RefreshAck>()
                .await
                .ok()
                .and_then(|ack| ack.message)
                .unwrap_or_else(|| "server is rate limiting forced refreshes".to_string());
            return Err(Error::ProtocolError(message));
        }

        response.error_for_status_ref()?;
        let ack = response.json::<RefreshAck>().await?;
        if !ack.success {
            return Err(Error::DataError(
                ack.message.unwrap_or_else(|| "refresh request rejected".to_string()),
            ));
        }
        Ok(ack)
    }
}

/// The health endpoint lives at a fixed path next to the sentiment endpoint
fn derive_health_url(sentiment_url: &str) -> Result<String> {
    let mut url = Url::parse(sentiment_url)
        .map_err(|e| Error::ConfigError(format!("invalid sentiment_url: {}", e)))?;
    url.set_path("/api/health");
    url.set_query(None);
    Ok(url.to_string())
}

/// Forced recomputes are POSTed to the refresh sub-path
fn derive_refresh_url(sentiment_url: &str) -> String {
    format!("{}/refresh", sentiment_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_response_parsing() {
        // Extra fields like "cached" and "last_updated" must be tolerated.
        let raw = r#"{
            "success": true,
            "data": { "final_score": 42.5, "interpretation": "Bullish", "timestamp": "2024-01-02T09:30:00" },
            "cached": true,
            "last_updated": "2024-01-02T09:30:00"
        }"#;
        let body: SentimentResponse = serde_json::from_str(raw).unwrap();
        let snapshot = body.into_snapshot().unwrap();
        assert_eq!(snapshot.final_score, 42.5);
        assert_eq!(snapshot.interpretation, "Bullish");
    }

    #[test]
    fn test_sentiment_response_unsuccessful() {
        let raw = r#"{ "success": false, "error": "No data available yet" }"#;
        let body: SentimentResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(body.into_snapshot(), Err(Error::DataError(_))));
    }

    #[test]
    fn test_sentiment_response_missing_data() {
        let raw = r#"{ "success": true }"#;
        let body: SentimentResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(body.into_snapshot(), Err(Error::DataError(_))));
    }

    #[test]
    fn test_components_response_parsing() {
        let raw = r#"{
            "success": true,
            "components": [
                { "name": "News Sentiment", "score": 30.0, "weight": 25 },
                { "name": "Vix", "score": -5.0 }
            ],
            "final_score": 12.0
        }"#;
        let body: ComponentsResponse = serde_json::from_str(raw).unwrap();
        let snapshot = body.into_snapshot().unwrap();
        assert_eq!(snapshot.components.len(), 2);
        assert_eq!(snapshot.components[0].name, "News Sentiment");
        assert_eq!(snapshot.components[0].weight, Some(25.0));
        assert_eq!(snapshot.components[1].weight, None);
        assert_eq!(snapshot.final_score, 12.0);
    }

    #[test]
    fn test_components_response_missing_final_score() {
        let raw = r#"{ "success": true, "components": [] }"#;
        let body: ComponentsResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(body.into_snapshot(), Err(Error::DataError(_))));
    }

    #[test]
    fn test_derived_urls() {
        let health = derive_health_url("http://localhost:5000/api/sentiment").unwrap();
        assert_eq!(health, "http://localhost:5000/api/health");

        let refresh = derive_refresh_url("http://localhost:5000/api/sentiment");
        assert_eq!(refresh, "http://localhost:5000/api/sentiment/refresh");

        let refresh_slash = derive_refresh_url("http://localhost:5000/api/sentiment/");
        assert_eq!(refresh_slash, "http://localhost:5000/api/sentiment/refresh");
    }
}
