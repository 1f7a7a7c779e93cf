//! CLI host for the sentiment indicators.
//! A timer stands in for the chart's per-bar callbacks: on every tick the
//! indicators are polled and the current values printed, while refreshes run
//! in the background exactly as they would under a real charting host.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

use sentiment_tracker::api::SentimentApiClient;
use sentiment_tracker::config::Config;
use sentiment_tracker::indicators::{
    Component, ComponentsIndicator, Interpretation, SentimentIndicator,
};
use sentiment_tracker::utils::init_logging;

#[derive(Debug, Parser)]
#[command(name = "sentiment-tracker", author, version, about = "Market sentiment tracker CLI", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML)
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Command to execute
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll the indicators on a fixed cadence and print the current values
    Run {
        /// Seconds between polls (stands in for the chart's bar interval)
        #[arg(long, default_value_t = 60)]
        every: u64,
        /// Also poll and print the component breakdown
        #[arg(long)]
        components: bool,
    },
    /// Fetch and print the blended score once
    Score,
    /// Fetch and print the component breakdown once
    Components,
    /// Query the API server's health endpoint
    Health,
    /// Ask the API server to recompute its score now
    Refresh,
    /// Generate a default configuration file
    Init {
        /// Output path for the config file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", Config::default_toml());
        return Ok(());
    }

    if let Some(Command::Init { config, force }) = &args.command {
        if Path::new(config).exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", config);
        }
        Config::default()
            .save(config)
            .with_context(|| format!("failed to write {}", config))?;
        println!("Wrote default configuration to {}", config);
        return Ok(());
    }

    let config = if Path::new(&args.config).exists() {
        Config::load(&args.config).with_context(|| format!("failed to load {}", args.config))?
    } else {
        Config::default()
    };
    init_logging(&config.app.log_level);

    match args.command {
        Some(Command::Score) => {
            let client = SentimentApiClient::new(&config.api)?;
            let snapshot = client.fetch_sentiment().await?;
            let zone = Interpretation::from_score(snapshot.final_score);
            println!(
                "{} {}",
                colorize_score(snapshot.final_score, zone),
                format!("({})", snapshot.interpretation).dimmed()
            );
        }
        Some(Command::Components) => {
            let client = SentimentApiClient::new(&config.api)?;
            let snapshot = client.fetch_components().await?;
            for entry in &snapshot.components {
                let weight = entry
                    .weight
                    .or_else(|| Component::from_label(&entry.name).map(|c| c.weight() as f64));
                print_component_row(&entry.name, entry.score, weight);
            }
            let zone = Interpretation::from_score(snapshot.final_score);
            println!(
                "{:25} | {} {}",
                "Final Score".bold(),
                colorize_score(snapshot.final_score, zone),
                format!("({})", zone).dimmed()
            );
        }
        Some(Command::Health) => {
            let client = SentimentApiClient::new(&config.api)?;
            let health = client.health().await?;
            println!("status:       {}", health.status);
            println!("timestamp:    {}", health.timestamp);
            println!("has_data:     {}", health.cache.has_data);
            println!(
                "last_updated: {}",
                health.cache.last_updated.as_deref().unwrap_or("never")
            );
            println!("updating:     {}", health.cache.updating);
        }
        Some(Command::Refresh) => {
            let client = SentimentApiClient::new(&config.api)?;
            let ack = client.force_refresh().await?;
            println!("{}", ack.message.unwrap_or_else(|| "Update started".to_string()));
        }
        Some(Command::Run { every, components }) => {
            run_loop(&config, every, components).await?;
        }
        Some(Command::Init { .. }) => unreachable!("handled above"),
        None => {
            // Same as `run` with defaults.
            run_loop(&config, 60, false).await?;
        }
    }

    Ok(())
}

/// The polling host: drives `poll` the way a chart drives its indicators
async fn run_loop(config: &Config, every: u64, components: bool) -> Result<()> {
    let sentiment = SentimentIndicator::new(config)?;
    let breakdown = if components {
        Some(ComponentsIndicator::new(config)?)
    } else {
        None
    };

    log::info!(
        "Polling every {}s (refresh interval {} min)",
        every,
        config.indicator.clamped_interval_minutes()
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
    loop {
        ticker.tick().await;
        let now = Utc::now();

        let score = sentiment.poll(now);
        let zone = sentiment.zone();
        println!(
            "{} {} {}",
            now.format("%H:%M:%S").to_string().dimmed(),
            colorize_score(score, zone),
            format!("({})", sentiment.interpretation()).dimmed()
        );

        if let Some(breakdown) = &breakdown {
            let scores = breakdown.poll(now);
            for component in Component::ALL {
                print_component_row(
                    &component.label_with_weight(),
                    scores.get(component),
                    None,
                );
            }
        }
    }
}

/// One breakdown line: label, score, optional weight column and a signed bar
fn print_component_row(label: &str, score: f64, weight: Option<f64>) {
    let bar_length = (score.abs() / 5.0) as usize;
    let bar = if score >= 0.0 {
        format!("+{}", "█".repeat(bar_length)).green()
    } else {
        format!("-{}", "█".repeat(bar_length)).red()
    };
    match weight {
        Some(weight) => println!("{:25} | {:7.1} | {:4.0}% | {}", label, score, weight, bar),
        None => println!("{:25} | {:7.1} | {}", label, score, bar),
    }
}

/// Color a score by its qualitative band
fn colorize_score(score: f64, zone: Interpretation) -> colored::ColoredString {
    let text = format!("{:.1}", score);
    match zone {
        Interpretation::StrongBullish => text.green().bold(),
        Interpretation::Bullish => text.green(),
        Interpretation::SlightlyBullish => text.bright_green(),
        Interpretation::Neutral => text.normal(),
        Interpretation::SlightlyBearish => text.bright_red(),
        Interpretation::Bearish => text.red(),
        Interpretation::StrongBearish => text.red().bold(),
    }
}
