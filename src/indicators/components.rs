//! Multi-value indicator: the six weighted sub-scores and the blended final
//! score, each plotted separately by the host.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::api::SentimentApiClient;
use crate::config::Config;
use crate::utils::error::Result;

use super::refresh::RefreshGate;
use super::{Component, ComponentScores, DiagnosticSink, LogSink};

struct Inner {
    client: SentimentApiClient,
    gate: RefreshGate,
    scores: RwLock<ComponentScores>,
    sink: Box<dyn DiagnosticSink>,
}

/// Chart indicator tracking the component breakdown.
///
/// Same contract as [`SentimentIndicator`]: `poll` never blocks and never
/// fails, refreshes run in the background, failures leave the cached scores
/// exactly as they were, and dropping the indicator releases the HTTP
/// client once any outstanding refresh has finished.
///
/// [`SentimentIndicator`]: super::SentimentIndicator
pub struct ComponentsIndicator {
    inner: Arc<Inner>,
}

impl ComponentsIndicator {
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
                scores: RwLock::new(ComponentScores::default()),
                sink,
            }),
        })
    }

    /// Read the current scores, scheduling a background refresh when one is
    /// due. Must be called from within a tokio runtime.
    pub fn poll(&self, now: DateTime<Utc>) -> ComponentScores {
        if self.inner.gate.try_begin(now) {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move { inner.refresh(now).await });
        }
        *self.inner.scores.read().unwrap()
    }

    /// Whether a refresh is currently in flight
    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_in_flight()
    }
}

impl Inner {
    /// One fetch attempt. Entries with unknown names are ignored; components
    /// absent from the response keep their previous value.
    async fn refresh(&self, trigger_ts: DateTime<Utc>) {
        match self.client.fetch_components().await {
            Ok(snapshot) => {
                let final_score;
                {
                    let mut scores = self.scores.write().unwrap();
                    for entry in &snapshot.components {
                        if let Some(component) = Component::from_label(&entry.name) {
                            scores.set(component, entry.score);
                        }
                    }
                    scores.final_score = snapshot.final_score;
                    final_score = scores.final_score;
                }
                self.sink.report(&format!("Components updated - final: {}", final_score));
                self.gate.complete_success(trigger_ts);
            }
            Err(err) => {
                self.sink.report(&format!("Error updating components: {}", err));
                self.gate.complete_failure();
            }
        }
    }
}
