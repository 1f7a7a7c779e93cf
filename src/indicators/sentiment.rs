//! Single-value indicator: the blended sentiment score plus the server's
//! qualitative interpretation.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::api::SentimentApiClient;
use crate::config::Config;
use crate::utils::error::Result;

use super::refresh::RefreshGate;
use super::{DiagnosticSink, Interpretation, LogSink};

/// Label shown until the first successful fetch
const LOADING_LABEL: &str = "Loading...";

struct Inner {
    client: SentimentApiClient,
    gate: RefreshGate,
    score: RwLock<f64>,
    interpretation: RwLock<String>,
    sink: Box<dyn DiagnosticSink>,
}

/// Chart indicator tracking the blended sentiment score.
///
/// [`poll`] is the host-facing read path: call it once per bar/tick with the
/// current timestamp. It never blocks and never fails; when a refresh is due
/// it schedules one on the ambient tokio runtime (fire-and-forget) and
/// returns the last known value immediately.
///
/// Dropping the indicator releases the underlying HTTP client once any
/// outstanding refresh has finished.
///
/// [`poll`]: SentimentIndicator::poll
pub struct SentimentIndicator {
    inner: Arc<Inner>,
}

impl SentimentIndicator {
    /// Create an indicator reporting diagnostics through the `log` facade
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_sink(config, Box::new(LogSink))
    }

    /// Create an indicator with a custom diagnostic sink
    pub fn with_sink(config: &Config, sink: Box<dyn DiagnosticSink>) -> Result<Self> {
        let client = SentimentApiClient::new(&config.api)?;
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                gate: RefreshGate::new(config.indicator.update_interval_minutes),
                score: RwLock::new(0.0),
                interpretation: RwLock::new(LOADING_LABEL.to_string()),
                sink,
            }),
        })
    }

    /// Read the current score, scheduling a background refresh when one is
    /// due. Must be called from within a tokio runtime.
    pub fn poll(&self, now: DateTime<Utc>) -> f64 {
        if self.inner.gate.try_begin(now) {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.refresh(now).await });
        }
        *self.inner.score.read().unwrap()
    }

    /// Last known qualitative interpretation from the API
    pub fn interpretation(&self) -> String {
        self.inner.interpretation.read().unwrap().clone()
    }

    /// Display label in the "Sentiment (<interpretation>)" form
    pub fn display_name(&self) -> String {
        format!("Sentiment ({})", self.interpretation())
    }

    /// Local qualitative band for the current score
    pub fn zone(&self) -> Interpretation {
        Interpretation::from_score(*self.inner.score.read().unwrap())
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_in_flight()
    }
}

impl Inner {
    /// One fetch attempt. Every failure class is absorbed here: reported to
    /// the sink, cached values untouched, in-flight flag cleared last.
    async fn refresh(&self, trigger_ts: DateTime<Utc>) {
        match self.client.fetch_sentiment().await {
            Ok(snapshot) => {
                *self.score.write().unwrap() = snapshot.final_score;
                *self.interpretation.write().unwrap() = snapshot.interpretation.clone();
                self.sink.report(&format!(
                    "Sentiment updated: {} ({})",
                    snapshot.final_score, snapshot.interpretation
                ));
                self.gate.complete_success(trigger_ts);
            }
            Err(err) => {
                self.sink.report(&format!("Error updating sentiment: {}", err));
                self.gate.complete_failure();
            }
        }
    }
}
