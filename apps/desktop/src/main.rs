use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{load_settings, SaveOutcome, StoreSettings, TallyClient};
use shared::domain::{clamp_slider_value, default_slider_values, SLIDER_KEYS};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tally", about = "Read and update the shared counter and sliders")]
struct Args {
    /// Overrides the configured store URL.
    #[arg(long)]
    store_url: Option<String>,
    /// Overrides the configured store access key.
    #[arg(long)]
    store_key: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Print results as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(subcommand)]
    Counter(CounterCommand),
    #[command(subcommand)]
    Sliders(SliderCommand),
}

#[derive(Subcommand, Debug)]
enum CounterCommand {
    Get,
    Increment,
}

#[derive(Subcommand, Debug)]
enum SliderCommand {
    Load,
    /// Each assignment is `KEY=VALUE`, e.g. `val0=7`.
    Save {
        #[arg(required = true)]
        assignments: Vec<String>,
    },
}

fn apply_overrides(mut settings: StoreSettings, args: &Args) -> StoreSettings {
    if let Some(url) = &args.store_url {
        settings.store_url = url.clone();
    }
    if let Some(key) = &args.store_key {
        settings.store_key = key.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.request_timeout_ms = timeout_ms;
    }
    settings
}

fn parse_assignments(assignments: &[String]) -> Result<BTreeMap<String, i64>> {
    let mut values = BTreeMap::new();
    for assignment in assignments {
        let (key, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{assignment}'"))?;
        let key = key.trim();
        if !SLIDER_KEYS.contains(&key) {
            bail!(
                "unknown slider key '{key}' (expected one of {})",
                SLIDER_KEYS.join(", ")
            );
        }
        let value: i64 = raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: '{raw}'"))?;
        let clamped = clamp_slider_value(value);
        if clamped != value {
            tracing::warn!(key, value, clamped, "slider value clamped into range");
        }
        values.insert(key.to_string(), clamped);
    }
    Ok(values)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = apply_overrides(load_settings(), &args);
    let client = TallyClient::connect(&settings).context("failed to build store client")?;

    match &args.command {
        Command::Counter(cmd) => {
            let counter = client.counter();
            let result = match cmd {
                CounterCommand::Get => counter.fetch().await,
                CounterCommand::Increment => counter.increment().await,
            };
            let value = result.map_err(|err| anyhow!(err.user_message()))?;
            if args.json {
                println!("{}", serde_json::to_string(&counter.state(value))?);
            } else {
                println!("Count: {value}");
            }
        }
        Command::Sliders(SliderCommand::Load) => {
            let report = client
                .load_sliders()
                .await
                .context("failed to load slider values")?;
            let mut values = default_slider_values();
            report.apply_to(&mut values);
            if args.json {
                println!("{}", serde_json::to_string(&values)?);
            } else {
                for key in SLIDER_KEYS {
                    let marker = if report.get(key).is_some() { "" } else { " (default)" };
                    println!("{key}: {}{marker}", values[key]);
                }
            }
        }
        Command::Sliders(SliderCommand::Save { assignments }) => {
            let values = parse_assignments(assignments)?;
            let report = client.save_sliders(&values).await;
            match report.outcome() {
                SaveOutcome::Success => println!("Saved {} value(s)", values.len()),
                SaveOutcome::Failure(reason) => {
                    bail!("{reason} (failed: {})", report.failed_keys().join(", "))
                }
            }
        }
    }

    Ok(())
}
