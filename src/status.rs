//! Outbound status notifications for UI collaborators
//!
//! The link core never talks to a dialog or screen directly; it fires these
//! notifications at whatever sink was injected and moves on.

use tracing::{error, info};

/// Sink for user-visible status updates, invoked from the link worker
pub trait StatusSink: Send + Sync {
    /// A slow operation started; show a progress indicator.
    fn show_wait(&self, message: &str);

    /// The slow operation finished; dismiss the progress indicator.
    fn hide_wait(&self);

    /// Report a failure to the user. Called exactly once per failure.
    fn error(&self, message: &str);
}

/// Sink that routes status updates to the log
pub struct LogSink;

impl StatusSink for LogSink {
    fn show_wait(&self, message: &str) {
        info!("{}", message);
    }

    fn hide_wait(&self) {
        info!("done");
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
