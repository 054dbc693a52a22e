use crate::{
    event::MediaEvent,
    reminder::ReminderInstance,
    shared::entity::{Entity, ID},
    subscription::{DeliveryMethod, Subscription},
};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Durable evidence that a `ReminderInstance` was dispatched. There is
/// exactly one `NotificationRecord` per fired `ReminderInstance`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRecord {
    pub id: ID,
    pub reminder_id: ID,
    pub subscription_id: ID,
    pub user_id: ID,
    pub event_id: ID,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub delivery_method: DeliveryMethod,
    /// Immutable once written
    pub sent_ts: i64,
    pub read_ts: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Reminder,
}

text_enum!(NotificationKind {
    Reminder => "reminder",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

impl NotificationRecord {
    pub fn for_reminder(
        reminder: &ReminderInstance,
        message: RenderedMessage,
        delivery_method: DeliveryMethod,
        sent_ts: i64,
    ) -> Self {
        Self {
            id: Default::default(),
            reminder_id: reminder.id.clone(),
            subscription_id: reminder.subscription_id.clone(),
            user_id: reminder.user_id.clone(),
            event_id: reminder.event_id.clone(),
            kind: NotificationKind::Reminder,
            title: message.title,
            message: message.body,
            delivery_method,
            sent_ts,
            read_ts: None,
        }
    }

    /// Marks the notification as read. The first read is the one that counts.
    pub fn mark_read(&mut self, read_ts: i64) {
        if self.read_ts.is_none() {
            self.read_ts = Some(read_ts);
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_ts.is_some()
    }
}

impl Entity for NotificationRecord {
    fn id(&self) -> &ID {
        &self.id
    }
}

fn humanize_offset(offset_minutes: i64) -> String {
    fn unit(n: i64, name: &str) -> String {
        if n == 1 {
            format!("1 {}", name)
        } else {
            format!("{} {}s", n, name)
        }
    }

    match offset_minutes {
        0 => "now".into(),
        m if m % (60 * 24) == 0 => format!("in {}", unit(m / (60 * 24), "day")),
        m if m % 60 == 0 => format!("in {}", unit(m / 60, "hour")),
        m if m > 60 => format!("in {} {}", unit(m / 60, "hour"), unit(m % 60, "minute")),
        m => format!("in {}", unit(m, "minute")),
    }
}

/// Renders the reminder message for `offset_minutes` before `event` in the
/// time zone of the user.
pub fn render_reminder(
    event: &MediaEvent,
    subscription: &Subscription,
    offset_minutes: i64,
    timezone: &Tz,
) -> RenderedMessage {
    let headline = match &subscription.custom_title {
        Some(title) if !title.trim().is_empty() => title.clone(),
        _ => event.headline(),
    };

    let title = match offset_minutes {
        0 => format!("{} is starting now", headline),
        _ => format!("{} starts {}", headline, humanize_offset(offset_minutes)),
    };

    let mut body = match Utc.timestamp_millis_opt(event.start_ts).single() {
        Some(start) => format!(
            "{} starts at {}",
            headline,
            start.with_timezone(timezone).format("%a %b %-d, %H:%M %Z")
        ),
        None => format!("{} is coming up", headline),
    };
    if !event.platforms.is_empty() {
        let platforms = event
            .platforms
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ");
        body.push_str(&format!(" on {}", platforms));
    }
    body.push('.');

    RenderedMessage { title, body }
}
