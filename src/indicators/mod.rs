//! Chart indicators backed by the sentiment API.
//!
//! Both indicators follow the same pattern: the host calls [`poll`] once per
//! bar/tick with the current timestamp and always gets the last known values
//! back immediately. When enough time has passed a background refresh is
//! scheduled; it either replaces the cached values or, on any failure, leaves
//! them untouched and reports the problem to the diagnostic sink.
//!
//! [`poll`]: SentimentIndicator::poll

mod components;
mod refresh;
mod sentiment;

pub use components::ComponentsIndicator;
pub use refresh::RefreshGate;
pub use sentiment::SentimentIndicator;

use serde::{Deserialize, Serialize};
use std::fmt;

/// One weighted sub-score of the blended sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Component {
    News,
    Social,
    Technical,
    Vix,
    PutCall,
    Analyst,
}

impl Component {
    /// All components, in the server's blend order
    pub const ALL: [Component; 6] = [
        Component::News,
        Component::Social,
        Component::Technical,
        Component::Vix,
        Component::PutCall,
        Component::Analyst,
    ];

    /// Map a server-provided display label (e.g. "News Sentiment",
    /// "VIX Level", "Put Call Ratio") onto a known component.
    ///
    /// Matching is case-insensitive on whole tokens, so unrelated words that
    /// merely contain a keyword do not match. Both "put" and "call" resolve
    /// to [`Component::PutCall`]: the server publishes a single blended
    /// put/call score under either word.
    pub fn from_label(label: &str) -> Option<Self> {
        let lower = label.to_lowercase();
        for token in lower.split(|c: char| !c.is_alphanumeric()) {
            let hit = match token {
                "news" => Some(Component::News),
                "social" => Some(Component::Social),
                "technical" | "technicals" => Some(Component::Technical),
                "vix" => Some(Component::Vix),
                "put" | "call" => Some(Component::PutCall),
                "analyst" | "analysts" => Some(Component::Analyst),
                _ => None,
            };
            if hit.is_some() {
                return hit;
            }
        }
        None
    }

    /// Server-side blend weight, in percent
    pub fn weight(&self) -> u8 {
        match self {
            Component::News => 25,
            Component::Social => 15,
            Component::Technical => 20,
            Component::Vix => 15,
            Component::PutCall => 10,
            Component::Analyst => 15,
        }
    }

    /// Short display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::News => "News",
            Component::Social => "Social",
            Component::Technical => "Technical",
            Component::Vix => "VIX",
            Component::PutCall => "Put/Call",
            Component::Analyst => "Analyst",
        }
    }

    /// Display name with the blend weight, e.g. "News (25%)"
    pub fn label_with_weight(&self) -> String {
        format!("{} ({}%)", self.as_str(), self.weight())
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative band for a sentiment score in [-100, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    StrongBullish,
    Bullish,
    SlightlyBullish,
    Neutral,
    SlightlyBearish,
    Bearish,
    StrongBearish,
}

impl Interpretation {
    /// Band thresholds used across the whole system: 50 / 30 / 10 on the
    /// bullish side, mirrored on the bearish side.
    pub fn from_score(score: f64) -> Self {
        if score >= 50.0 {
            Interpretation::StrongBullish
        } else if score >= 30.0 {
            Interpretation::Bullish
        } else if score >= 10.0 {
            Interpretation::SlightlyBullish
        } else if score >= -10.0 {
            Interpretation::Neutral
        } else if score >= -30.0 {
            Interpretation::SlightlyBearish
        } else if score >= -50.0 {
            Interpretation::Bearish
        } else {
            Interpretation::StrongBearish
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interpretation::StrongBullish => "Strong Bullish",
            Interpretation::Bullish => "Bullish",
            Interpretation::SlightlyBullish => "Slightly Bullish",
            Interpretation::Neutral => "Neutral",
            Interpretation::SlightlyBearish => "Slightly Bearish",
            Interpretation::Bearish => "Bearish",
            Interpretation::StrongBearish => "Strong Bearish",
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recently accepted component values. Every field starts at the
/// neutral 0 until the first successful fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub news: f64,
    pub social: f64,
    pub technical: f64,
    pub vix: f64,
    pub put_call: f64,
    pub analyst: f64,
    pub final_score: f64,
}

impl ComponentScores {
    /// Read one component's score
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::News => self.news,
            Component::Social => self.social,
            Component::Technical => self.technical,
            Component::Vix => self.vix,
            Component::PutCall => self.put_call,
            Component::Analyst => self.analyst,
        }
    }

    /// Overwrite one component's score
    pub fn set(&mut self, component: Component, score: f64) {
        match component {
            Component::News => self.news = score,
            Component::Social => self.social = score,
            Component::Technical => self.technical = score,
            Component::Vix => self.vix = score,
            Component::PutCall => self.put_call = score,
            Component::Analyst => self.analyst = score,
        }
    }
}

/// Destination for human-readable status and error lines from background
/// refreshes. Hosts own presentation; nothing ever fails through this.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Default sink forwarding to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, message: &str) {
        log::info!("{}", message);
    }
}
