use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

/// A transient toast for the web view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub timestamp: String,
}

/// Pending toasts, drained by the UI after each command.
#[derive(Debug, Default)]
pub struct Notifications {
    pending: Vec<Notification>,
}

impl Notifications {
    pub fn success(&mut self, message: &str) {
        self.push(Level::Success, message);
    }

    pub fn error(&mut self, message: &str) {
        self.push(Level::Error, message);
    }

    fn push(&mut self, level: Level, message: &str) {
        self.pending.push(Notification {
            level,
            message: message.to_string(),
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }
}
