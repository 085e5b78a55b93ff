// Copyright Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Attribution cannot be removed

//! Drives a [`VehicleTracker`] on a fixed interval.
//!
//! `start` polls once immediately and then every interval. Cycles run inline
//! in a single task, so they never overlap; ticks missed while a slow cycle is
//! in flight are skipped. Dropping the scheduler stops it.

use crate::feed_source::FeedSource;
use crate::tracker::VehicleTracker;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

enum SchedulerState {
    Idle,
    Running {
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    },
}

pub struct PollScheduler<S: FeedSource> {
    tracker: Arc<VehicleTracker<S>>,
    poll_interval: Duration,
    state: SchedulerState,
}

impl<S: FeedSource> PollScheduler<S> {
    pub fn new(tracker: Arc<VehicleTracker<S>>, poll_interval: Duration) -> Self {
        PollScheduler {
            tracker,
            poll_interval,
            state: SchedulerState::Idle,
        }
    }

    pub fn tracker(&self) -> &Arc<VehicleTracker<S>> {
        &self.tracker
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SchedulerState::Running { .. })
    }

    /// Idle -> Running. Returns `false` if it was already running.
    ///
    /// A cycle cancelled by a preceding `stop` may still be finishing its
    /// fetch, so right after a restart two fetches can be in flight. Only the
    /// new cycle can publish.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_poll_loop(
            self.tracker.clone(),
            self.poll_interval,
            cancel.clone(),
        ));

        info!(
            url = self.tracker.source().url(),
            interval_secs = self.poll_interval.as_secs_f64(),
            "poll scheduler started"
        );

        self.state = SchedulerState::Running { cancel, handle };
        true
    }

    /// Running -> Idle. A cycle already in flight may finish, but its result
    /// is not published. Returns `false` if it was not running.
    pub fn stop(&mut self) -> bool {
        match std::mem::replace(&mut self.state, SchedulerState::Idle) {
            SchedulerState::Running { cancel, .. } => {
                cancel.cancel();
                info!("poll scheduler stopped");
                true
            }
            SchedulerState::Idle => false,
        }
    }

    /// Stops and waits for the polling task to exit.
    pub async fn shutdown(mut self) {
        if let SchedulerState::Running { cancel, handle } =
            std::mem::replace(&mut self.state, SchedulerState::Idle)
        {
            cancel.cancel();

            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }

            info!("poll scheduler shut down");
        }
    }
}

impl<S: FeedSource> Drop for PollScheduler<S> {
    fn drop(&mut self) {
        if let SchedulerState::Running { cancel, .. } = &self.state {
            cancel.cancel();
        }
    }
}

async fn run_poll_loop<S: FeedSource>(
    tracker: Arc<VehicleTracker<S>>,
    poll_interval: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("poll loop exiting");
                break;
            }

            _ = interval.tick() => {
                tracker.poll_and_log(&cancel).await;
            }
        }
    }
}
