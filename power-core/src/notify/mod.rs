//! Reporting sink for non-fatal warnings (ignored triggers, cooldown time).
//!
//! Fire-and-forget: nothing in the core depends on a notice being delivered.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

pub trait Notifier: Send + Sync {
    /// `key` is a localization message key; `args` fill its placeholders
    fn notify(&self, target: &str, key: &str, args: &[String]);
}

/// Writes every notice to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, target: &str, key: &str, args: &[String]) {
        info!(target_name = target, key, args = ?args, "notice");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub target: String,
    pub key: String,
    pub args: Vec<String>,
}

/// Records notices in arrival order
#[derive(Debug, Default)]
pub struct MessageLog {
    notices: Mutex<Vec<Notice>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Drain all recorded notices
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    pub fn len(&self) -> usize {
        self.notices.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.lock().is_empty()
    }
}

impl Notifier for MessageLog {
    fn notify(&self, target: &str, key: &str, args: &[String]) {
        self.notices.lock().push(Notice {
            target: target.to_string(),
            key: key.to_string(),
            args: args.to_vec(),
        });
    }
}
