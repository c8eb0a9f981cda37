//! The polling schedule.
//!
//! One forced cycle at startup, then one cycle per poll interval until the
//! shutdown flag flips. Cycles never overlap; a cycle still running when
//! shutdown arrives is abandoned.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use super::detector::{ChangeDetector, CycleReport};
use super::notifier::{Notifier, STARTED_MESSAGE, STOPPED_MESSAGE};
use crate::auth::SessionManager;
use crate::error::WatchResult;
use crate::presence::PresenceClient;

/// Default time between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(120);

/// Drives presence polling, change detection and notification.
#[derive(Debug)]
pub struct StatusMonitor {
    user_ids: Vec<String>,
    presence: PresenceClient,
    detector: ChangeDetector,
    notifier: Notifier,
    session: Option<Arc<SessionManager>>,
    poll_interval: Duration,
}

impl StatusMonitor {
    pub fn new(
        user_ids: Vec<String>,
        presence: PresenceClient,
        detector: ChangeDetector,
        notifier: Notifier,
    ) -> Self {
        Self {
            user_ids,
            presence,
            detector,
            notifier,
            session: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Re-login through `session` when a whole batch comes back unauthorized.
    pub fn with_session(mut self, session: Arc<SessionManager>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Run a single cycle: fetch, evaluate, notify.
    ///
    /// Only a failed re-login surfaces as an error; fetch and delivery
    /// problems are absorbed below this level.
    pub async fn run_cycle(&mut self, force: bool) -> WatchResult<CycleReport> {
        let mut snapshots = self.presence.fetch_statuses(&self.user_ids).await;

        if self.presence.last_batch_unauthorized() {
            if let Some(session) = &self.session {
                if session.reauthenticate().await? {
                    snapshots = self.presence.fetch_statuses(&self.user_ids).await;
                } else {
                    warn!("Session expired and could not be renewed without input");
                }
            }
        }

        let report = self.detector.evaluate(&snapshots, force, Utc::now());
        info!("\n{}", report.text);
        self.notifier.deliver(&report).await;
        Ok(report)
    }

    /// Run until `shutdown` becomes `true` (or its sender is dropped), then
    /// send the stop announcement.
    pub async fn start(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Starting VRChat status monitoring ({} users, every {}s)",
            self.user_ids.len(),
            self.poll_interval.as_secs()
        );
        self.notifier.announce(STARTED_MESSAGE).await;

        if self.run_until_shutdown(true, &mut shutdown).await {
            let mut ticker = interval_at(Instant::now() + self.poll_interval, self.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = wait_for_shutdown(&mut shutdown) => break,
                    _ = ticker.tick() => {
                        if !self.run_until_shutdown(false, &mut shutdown).await {
                            break;
                        }
                    }
                }
            }
        }

        self.notifier.announce(STOPPED_MESSAGE).await;
    }

    /// Run one cycle unless shutdown wins. Returns `false` on shutdown.
    async fn run_until_shutdown(
        &mut self,
        force: bool,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        tokio::select! {
            biased;
            _ = wait_for_shutdown(shutdown) => false,
            result = self.run_cycle(force) => {
                if let Err(e) = result {
                    error!("Status check failed [{}]: {}", e.error_code(), e);
                }
                true
            }
        }
    }
}

async fn wait_for_shutdown(shutdown: &mut watch::Receiver<bool>) {
    // A dropped sender counts as shutdown.
    let _ = shutdown.wait_for(|stop| *stop).await;
}
