//! # titan-ops
//!
//! Boots the service stack against the in-memory adapter and runs an
//! allocation drill, printing the final hub as JSON.

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use titan_service::{Config, DrillPlan, LogFormat, ServiceContext, run_drill};

#[derive(Parser, Debug)]
#[command(name = "titan-ops")]
#[command(about = "Run a hub allocation drill")]
struct Args {
    /// Name of the hub to found
    #[arg(long, default_value = "Hong Kong Hub")]
    hub_name: String,

    /// Hub city
    #[arg(long, default_value = "Hong Kong")]
    city: String,

    /// Hub country
    #[arg(long, default_value = "China")]
    country: String,

    #[arg(long, default_value = "22.3193", allow_negative_numbers = true)]
    latitude: f64,

    #[arg(long, default_value = "114.1694", allow_negative_numbers = true)]
    longitude: f64,

    /// Unit slots at the hub
    #[arg(long, default_value = "4")]
    capacity: u32,

    /// Units to commission and allocate
    #[arg(long, default_value = "6")]
    units: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = Config::from_env();

    init_tracing(&config);
    info!(version = titan_service::VERSION, "Starting titan-ops");

    let ctx = ServiceContext::in_memory(config);

    let mut events = ctx.subscribe();
    let listener = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => info!(
                    event = event.event_name(),
                    hub_id = ?event.hub_id,
                    unit_id = %event.unit_id(),
                    "Domain event"
                ),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event listener lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let plan = DrillPlan {
        hub_name: args.hub_name,
        city: args.city,
        country: args.country,
        latitude: args.latitude,
        longitude: args.longitude,
        capacity: args.capacity,
        units: args.units,
    };
    let report = run_drill(&ctx, &plan).await?;

    // Closing the channel ends the listener once it has drained
    drop(ctx);
    listener.await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());

    // Logs go to stderr so stdout carries only the report
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}
