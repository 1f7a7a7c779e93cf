//! End-to-end tests for the component-breakdown indicator: label mapping,
//! partial updates, and failure isolation.

use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use chrono::{DateTime, TimeZone, Utc};

use sentiment_tracker::config::Config;
use sentiment_tracker::indicators::{ComponentsIndicator, DiagnosticSink};

#[derive(Clone, Default)]
struct RecordingSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DiagnosticSink for RecordingSink {
    fn report(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn test_config(server_url: &str, minutes: u32) -> Config {
    let mut config = Config::default();
    config.api.sentiment_url = format!("{}/api/sentiment", server_url);
    config.api.components_url = format!("{}/api/sentiment/components", server_url);
    config.indicator.update_interval_minutes = minutes;
    config
}

fn ts(minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 9, minute, second).unwrap()
}

async fn wait_until_idle(indicator: &ComponentsIndicator) {
    for _ in 0..200 {
        if !indicator.is_refreshing() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("refresh did not settle within 2s");
}

#[tokio::test]
async fn partial_component_response_updates_only_named_fields() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"components":[
                {"name":"News Sentiment","score":30},
                {"name":"VIX Level","score":-5}
            ],"final_score":12}"#,
        )
        .create_async()
        .await;

    let indicator = ComponentsIndicator::new(&test_config(&server.url(), 15)).unwrap();

    // First poll serves the all-neutral default.
    let initial = indicator.poll(ts(0, 0));
    assert_eq!(initial.news, 0.0);
    assert_eq!(initial.final_score, 0.0);
    wait_until_idle(&indicator).await;

    let scores = indicator.poll(ts(1, 0));
    assert_eq!(scores.news, 30.0);
    assert_eq!(scores.vix, -5.0);
    assert_eq!(scores.social, 0.0);
    assert_eq!(scores.technical, 0.0);
    assert_eq!(scores.put_call, 0.0);
    assert_eq!(scores.analyst, 0.0);
    assert_eq!(scores.final_score, 12.0);
}

#[tokio::test]
async fn full_breakdown_with_unknown_names_ignored() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"components":[
                {"name":"News Sentiment","score":22.5,"weight":25},
                {"name":"Social Sentiment","score":15,"weight":15},
                {"name":"Technical","score":-8,"weight":20},
                {"name":"Vix","score":4,"weight":15},
                {"name":"Put Call Ratio","score":-7,"weight":10},
                {"name":"Analyst Recommendations","score":10,"weight":15},
                {"name":"Galactic Mood","score":99}
            ],"final_score":6.3}"#,
        )
        .create_async()
        .await;

    let indicator = ComponentsIndicator::new(&test_config(&server.url(), 15)).unwrap();
    indicator.poll(ts(0, 0));
    wait_until_idle(&indicator).await;

    let scores = indicator.poll(ts(1, 0));
    assert_eq!(scores.news, 22.5);
    assert_eq!(scores.social, 15.0);
    assert_eq!(scores.technical, -8.0);
    assert_eq!(scores.vix, 4.0);
    assert_eq!(scores.put_call, -7.0);
    assert_eq!(scores.analyst, 10.0);
    assert_eq!(scores.final_score, 6.3);
}

#[tokio::test]
async fn later_partial_update_keeps_previous_values() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"components":[
                {"name":"News Sentiment","score":30},
                {"name":"Social Sentiment","score":20}
            ],"final_score":25}"#,
        )
        .create_async()
        .await;

    let indicator = ComponentsIndicator::new(&test_config(&server.url(), 15)).unwrap();
    indicator.poll(ts(0, 0));
    wait_until_idle(&indicator).await;

    server.reset_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"components":[
                {"name":"Social Sentiment","score":-1}
            ],"final_score":3}"#,
        )
        .create_async()
        .await;

    indicator.poll(ts(16, 0));
    wait_until_idle(&indicator).await;

    let scores = indicator.poll(ts(17, 0));
    assert_eq!(scores.news, 30.0, "components absent from the response keep their value");
    assert_eq!(scores.social, -1.0);
    assert_eq!(scores.final_score, 3.0);
}

#[tokio::test]
async fn failed_fetch_leaves_scores_untouched() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"success":true,"components":[
                {"name":"News Sentiment","score":30}
            ],"final_score":12}"#,
        )
        .create_async()
        .await;

    let sink = RecordingSink::default();
    let indicator = ComponentsIndicator::with_sink(
        &test_config(&server.url(), 15),
        Box::new(sink.clone()),
    )
    .unwrap();

    indicator.poll(ts(0, 0));
    wait_until_idle(&indicator).await;

    server.reset_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":false,"error":"No data available"}"#)
        .create_async()
        .await;

    indicator.poll(ts(16, 0));
    wait_until_idle(&indicator).await;
    assert!(!indicator.is_refreshing());
    assert!(sink.contains("Error updating components"));

    let scores = indicator.poll(ts(16, 30));
    assert_eq!(scores.news, 30.0);
    assert_eq!(scores.final_score, 12.0);
}

#[tokio::test]
async fn missing_final_score_is_a_failure() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/sentiment/components")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true,"components":[{"name":"News Sentiment","score":30}]}"#)
        .create_async()
        .await;

    let sink = RecordingSink::default();
    let indicator = ComponentsIndicator::with_sink(
        &test_config(&server.url(), 15),
        Box::new(sink.clone()),
    )
    .unwrap();

    indicator.poll(ts(0, 0));
    wait_until_idle(&indicator).await;

    // The whole payload is rejected; nothing is partially applied.
    let scores = indicator.poll(ts(1, 0));
    assert_eq!(scores.news, 0.0);
    assert!(sink.contains("final_score"));
}
