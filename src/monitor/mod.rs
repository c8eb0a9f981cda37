//! Status monitoring: change detection, notification and the schedule.

pub mod detector;
pub mod notifier;
pub mod runner;

pub use detector::{ChangeDetector, CycleReport, DEFAULT_REPORT_INTERVAL};
pub use notifier::{format_batch, Notifier, STARTED_MESSAGE, STOPPED_MESSAGE};
pub use runner::{StatusMonitor, DEFAULT_POLL_INTERVAL};
