use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    Info,
    Warning,
}

/// In-app notice shown to the player, e.g. a completed building or a failed sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub read: bool,
}

impl Notification {
    pub fn info(title: impl Into<String>, body: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(NotificationKind::Info, title.into(), body.into(), now)
    }

    pub fn warning(title: impl Into<String>, body: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::new(NotificationKind::Warning, title.into(), body.into(), now)
    }

    fn new(kind: NotificationKind, title: String, body: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            body,
            created_at: now,
            read: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub id: Uuid,
    pub from: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub read: bool,
}

impl MailMessage {
    pub fn new(
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
            received_at,
            read: false,
        }
    }
}
