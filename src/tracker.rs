// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

//! Owner of the live vehicle table.
//!
//! A poll cycle is fetch, decode, extract, merge, publish. The merge runs
//! against the currently published snapshot and the result is installed with
//! a compare-and-publish, so a result computed from a stale snapshot or by a
//! stopped scheduler is dropped instead of overwriting newer data.

use crate::errors::PollError;
use crate::extract::extract_vehicle_readings;
use crate::feed_source::FeedSource;
use crate::gtfs_rt_handlers::parse_protobuf_message;
use crate::validate_gtfs_rt::FeedQualityReport;
use crate::vehicle_table::{RetentionPolicy, VehicleTable};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollReport {
    /// Version of the table this cycle produced.
    pub version: u64,
    pub vehicles: usize,
    pub quality: FeedQualityReport,
    pub published: bool,
}

/// Read-only view of the published snapshots.
#[derive(Clone, Debug)]
pub struct VehicleSubscriber {
    receiver: watch::Receiver<Arc<VehicleTable>>,
}

impl VehicleSubscriber {
    pub fn current(&self) -> Arc<VehicleTable> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next published snapshot. `None` once the tracker is gone.
    pub async fn changed(&mut self) -> Option<Arc<VehicleTable>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

pub struct VehicleTracker<S> {
    source: S,
    retention: RetentionPolicy,
    publisher: watch::Sender<Arc<VehicleTable>>,
}

impl<S: FeedSource> VehicleTracker<S> {
    pub fn new(source: S) -> Self {
        let (publisher, _) = watch::channel(Arc::new(VehicleTable::new()));

        VehicleTracker {
            source,
            retention: RetentionPolicy::default(),
            publisher,
        }
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn subscribe(&self) -> VehicleSubscriber {
        VehicleSubscriber {
            receiver: self.publisher.subscribe(),
        }
    }

    pub fn current(&self) -> Arc<VehicleTable> {
        self.publisher.borrow().clone()
    }

    /// Runs one poll cycle. On error nothing is published.
    ///
    /// `liveness` is checked right before publishing; once it is cancelled the
    /// merged table is thrown away.
    pub async fn poll_once(&self, liveness: &CancellationToken) -> Result<PollReport, PollError> {
        let bytes = self.source.fetch().await?;
        let feed = parse_protobuf_message(&bytes)?;
        let (readings, quality) = extract_vehicle_readings(&feed);

        let base = self.current();
        let merged = Arc::new(base.merge_readings_with(readings, &self.retention));

        let version = merged.version();
        let vehicles = merged.len();
        let published = self.publish(&base, merged, liveness);

        Ok(PollReport {
            version,
            vehicles,
            quality,
            published,
        })
    }

    /// Same as [`poll_once`](Self::poll_once) but reports the outcome through tracing.
    pub async fn poll_and_log(&self, liveness: &CancellationToken) -> Option<PollReport> {
        let start = Instant::now();

        match self.poll_once(liveness).await {
            Ok(report) => {
                let elapsed_ms = start.elapsed().as_millis() as u64;

                if report.published {
                    info!(
                        version = report.version,
                        vehicles = report.vehicles,
                        readings = report.quality.accepted_readings,
                        skipped = report.quality.skipped_entities(),
                        elapsed_ms,
                        "published vehicle snapshot"
                    );
                } else {
                    debug!(
                        version = report.version,
                        "discarded poll result for a stopped or superseded cycle"
                    );
                }

                if report.quality.vehicles_at_null_island > 0 {
                    warn!(
                        url = self.source.url(),
                        count = report.quality.vehicles_at_null_island,
                        "feed has vehicles at null island"
                    );
                }

                Some(report)
            }
            Err(e @ PollError::Decode(_)) => {
                error!(url = self.source.url(), error = %e, "poll cycle failed");
                None
            }
            Err(e) => {
                warn!(url = self.source.url(), error = %e, "poll cycle failed");
                None
            }
        }
    }

    fn publish(
        &self,
        base: &VehicleTable,
        next: Arc<VehicleTable>,
        liveness: &CancellationToken,
    ) -> bool {
        self.publisher.send_if_modified(|current| {
            if liveness.is_cancelled() || current.version() != base.version() {
                return false;
            }

            *current = next;
            true
        })
    }
}
