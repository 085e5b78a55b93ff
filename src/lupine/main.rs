// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

use clap::Parser;
use live_vehicles::config::{DEFAULT_FEED_URL, TrackerConfig};
use live_vehicles::{
    ClientIdentity, HttpFeedSource, PollScheduler, RetentionPolicy, VehicleRecord, VehicleTable,
    VehicleTracker,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Polls a GTFS-rt vehicle positions feed and tracks live vehicles", long_about = None)]
struct Args {
    /// GTFS-rt vehicle positions endpoint
    #[arg(long, env = "FEED_URL", default_value = DEFAULT_FEED_URL)]
    feed_url: String,
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = 15)]
    poll_interval_secs: u64,
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    request_timeout_secs: u64,
    /// Sent to the feed operator to identify this client
    #[arg(long, env = "CLIENT_NAME")]
    client_name: Option<String>,
    #[arg(long, env = "CLIENT_NAME_HEADER", default_value = "ET-Client-Name")]
    client_name_header: String,
    /// Forget vehicles after this many polls without a reading
    #[arg(long, env = "MAX_MISSED_POLLS")]
    max_missed_polls: Option<u64>,
    /// Keep at most this many positions per vehicle
    #[arg(long, env = "MAX_HISTORY")]
    max_history: Option<usize>,
    #[arg(long, env = "LOG_LEVEL", default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
    /// Print every snapshot to stdout as a JSON line
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl Args {
    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            feed_url: self.feed_url.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            client_identity: self.client_name.as_ref().map(|name| ClientIdentity {
                header: self.client_name_header.clone(),
                value: name.clone(),
            }),
            retention: RetentionPolicy {
                max_missed_polls: self.max_missed_polls,
                max_history: self.max_history,
            },
        }
    }
}

#[derive(Serialize)]
struct SnapshotOutput<'a> {
    version: u64,
    vehicles: &'a [VehicleRecord],
}

fn present(snapshot: &VehicleTable, json: bool) {
    info!(
        version = snapshot.version(),
        vehicles = snapshot.len(),
        samples = snapshot.total_samples(),
        "vehicle snapshot"
    );

    if json {
        let records = snapshot.to_records();
        let output = SnapshotOutput {
            version: snapshot.version(),
            vehicles: &records,
        };

        match serde_json::to_string(&output) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "could not serialise snapshot"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    let config = args.tracker_config();
    let source = HttpFeedSource::from_config(&config)?;
    let tracker = Arc::new(VehicleTracker::new(source).with_retention(config.retention.clone()));

    let mut subscriber = tracker.subscribe();
    let json = args.json;
    let presenter = tokio::spawn(async move {
        while let Some(snapshot) = subscriber.changed().await {
            present(&snapshot, json);
        }
    });

    let mut scheduler = PollScheduler::new(tracker, config.poll_interval);
    scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("received ctrl-c, shutting down");

    scheduler.shutdown().await;
    presenter.await?;

    Ok(())
}
