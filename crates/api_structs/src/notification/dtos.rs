use binge_calendar_domain::{DeliveryMethod, NotificationKind, NotificationRecord, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDTO {
    pub id: ID,
    pub reminder_id: ID,
    pub subscription_id: ID,
    pub event_id: ID,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub delivery_method: DeliveryMethod,
    pub sent_ts: i64,
    pub read_ts: Option<i64>,
}

impl NotificationDTO {
    pub fn new(notification: NotificationRecord) -> Self {
        Self {
            id: notification.id,
            reminder_id: notification.reminder_id,
            subscription_id: notification.subscription_id,
            event_id: notification.event_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            delivery_method: notification.delivery_method,
            sent_ts: notification.sent_ts,
            read_ts: notification.read_ts,
        }
    }
}
