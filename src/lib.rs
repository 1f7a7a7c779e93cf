//! # Sentiment Tracker Rust
//! Chart-indicator client for an external market-sentiment API.
//!
//! The sentiment itself (news, social media, technicals, VIX, put/call,
//! analyst ratings and their weighting) is computed server-side; this crate
//! keeps the latest score fresh on a chart without ever blocking the host's
//! render path.

pub use crate::utils::error::{Error, Result};

pub mod api;
pub mod config;
pub mod indicators;
pub mod utils;
