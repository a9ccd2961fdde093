//! Viewer options.
//!
//! | Option            | Default | Meaning                                     |
//! |-------------------|---------|---------------------------------------------|
//! | `tab_stop`        | 8       | Render columns per tab stop (1 to 64)       |
//! | `message_timeout` | 5 s     | How long a status message stays on screen   |
//!
//! The binary fills these in from its command line; everything else reads
//! them from the [`Editor`](crate::editor::Editor).

use std::time::Duration;

use crate::row::{TAB_STOP, clamp_tab_stop};

/// How long a status message stays visible by default.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Display settings for one viewer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Render columns per tab stop.
    pub tab_stop: usize,
    /// How long a status message stays on screen after it was set.
    pub message_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: TAB_STOP,
            message_timeout: MESSAGE_TIMEOUT,
        }
    }
}

impl Options {
    /// Set the tab stop, clamped to `1..=MAX_TAB_STOP`.
    #[must_use]
    pub const fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = clamp_tab_stop(tab_stop);
        self
    }

    /// Set the status message timeout.
    #[must_use]
    pub const fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }
}
