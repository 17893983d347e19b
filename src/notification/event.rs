//! Raw notification events as delivered by the OS

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of notification-state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A notification was posted or its content changed
    NotificationStateChanged,
    /// Anything else the OS reports (window changes, clicks, ...)
    #[serde(untagged)]
    Other(String),
}

/// One notification-state change observed by the OS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(default = "default_kind")]
    pub kind: EventKind,
    /// Package id of the posting app
    #[serde(default)]
    pub source_app_id: Option<String>,
    /// First text item of the notification
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

fn default_kind() -> EventKind {
    EventKind::NotificationStateChanged
}

impl NotificationEvent {
    /// Create a posted/changed notification event received now
    pub fn posted(source_app_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::NotificationStateChanged,
            source_app_id: Some(source_app_id.into()),
            text: Some(text.into()),
            received_at: Utc::now(),
        }
    }

    /// Override the event kind
    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the receive time
    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    /// Whether this is a posted/changed notification
    pub fn is_notification(&self) -> bool {
        self.kind == EventKind::NotificationStateChanged
    }

    /// Source id if present and non-empty
    pub fn source(&self) -> Option<&str> {
        self.source_app_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Text if present and non-empty
    pub fn content(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }
}
