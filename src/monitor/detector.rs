//! Change detection and report throttling.
//!
//! The detector owns the only cross-cycle state of the monitor: the last
//! location seen per user and when a batch report last went out.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};

use crate::presence::{StatusSnapshot, OFFLINE_LOCATION};

/// Default quiet period after which a report is sent even with no changes.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(60 * 60);

const ENTRY_SEPARATOR: &str = "------------------------";

/// Outcome of evaluating one polling cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    /// One formatted block per user, in input order.
    pub entries: Vec<String>,
    /// "Came online" alerts for favorites, sent on their own.
    pub alerts: Vec<String>,
    /// Any user whose location differs from the previous cycle, or is new.
    pub any_changed: bool,
    /// Whether the batch report passed the throttle.
    pub should_send: bool,
    /// Header plus all entries.
    pub text: String,
}

/// Compares successive snapshots and decides what to report.
#[derive(Debug)]
pub struct ChangeDetector {
    favorites: HashSet<String>,
    mention_user_id: Option<String>,
    report_interval: Duration,
    last_location: HashMap<String, String>,
    last_sent: Option<DateTime<Utc>>,
}

impl ChangeDetector {
    pub fn new<I, S>(favorites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            favorites: favorites.into_iter().map(Into::into).collect(),
            mention_user_id: None,
            report_interval: DEFAULT_REPORT_INTERVAL,
            last_location: HashMap::new(),
            last_sent: None,
        }
    }

    /// Chat user to ping in favorite alerts.
    pub fn with_mention(mut self, user_id: Option<String>) -> Self {
        self.mention_user_id = user_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn last_sent(&self) -> Option<DateTime<Utc>> {
        self.last_sent
    }

    pub fn last_location(&self, user_id: &str) -> Option<&str> {
        self.last_location.get(user_id).map(String::as_str)
    }

    pub fn is_favorite(&self, user_id: &str) -> bool {
        self.favorites.contains(user_id)
    }

    /// Evaluate one cycle's snapshots at `now`.
    ///
    /// Locations are recorded for every user on every call. The batch report
    /// passes when forced, when anything changed, or when the report interval
    /// has elapsed; passing stamps `last_sent` whether or not delivery later
    /// succeeds.
    pub fn evaluate(
        &mut self,
        snapshots: &[StatusSnapshot],
        force: bool,
        now: DateTime<Utc>,
    ) -> CycleReport {
        let clock = clock_label(now);
        let mut report = CycleReport::default();

        for snapshot in snapshots {
            let previous = self.last_location.get(&snapshot.id).cloned();
            let changed = previous.as_deref() != Some(snapshot.location.as_str());

            report
                .entries
                .push(format_entry(&clock, snapshot, previous.as_deref()));

            let came_online =
                previous.as_deref() == Some(OFFLINE_LOCATION) && !snapshot.is_offline();
            if came_online && self.is_favorite(&snapshot.id) {
                report.alerts.push(self.format_alert(snapshot));
            }

            report.any_changed |= changed;
            self.last_location
                .insert(snapshot.id.clone(), snapshot.location.clone());
        }

        report.should_send = force || report.any_changed || self.interval_elapsed(now);
        if report.should_send {
            self.last_sent = Some(now);
        }

        report.text = format!(
            "=== Checking statuses at {} ===\n\n{}",
            clock,
            report.entries.concat()
        );
        report
    }

    fn interval_elapsed(&self, now: DateTime<Utc>) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .map(|elapsed| elapsed > self.report_interval)
                .unwrap_or(false),
        }
    }

    fn format_alert(&self, snapshot: &StatusSnapshot) -> String {
        let prefix = match &self.mention_user_id {
            Some(id) => format!("<@{}> ", id),
            None => String::new(),
        };
        format!(
            "{}{} came online!\nStatus: {}\nLocation: {}",
            prefix, snapshot.display_name, snapshot.state, snapshot.location
        )
    }
}

fn clock_label(now: DateTime<Utc>) -> String {
    now.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn format_entry(clock: &str, snapshot: &StatusSnapshot, previous: Option<&str>) -> String {
    let mut entry = format!(
        "[{}] {}:\nStatus: {}\n",
        clock, snapshot.display_name, snapshot.state
    );
    if !snapshot.is_offline() {
        entry.push_str(&format!("Location: {}\n", snapshot.place()));
    }
    if matches!(previous, Some(prev) if prev != snapshot.location) {
        entry.push_str("Note: Location changed!\n");
    }
    entry.push_str(ENTRY_SEPARATOR);
    entry.push('\n');
    entry
}
