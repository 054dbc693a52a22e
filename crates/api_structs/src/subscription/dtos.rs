use binge_calendar_domain::{
    DeliveryMethod, ReminderInstance, ReminderState, Subscription, WatchStatus, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionDTO {
    pub id: ID,
    pub user_id: ID,
    pub event_id: ID,
    pub reminder_offsets: Vec<i64>,
    pub notifications_enabled: bool,
    pub delivery_method: DeliveryMethod,
    pub watch_status: WatchStatus,
    pub custom_title: Option<String>,
    pub custom_notes: Option<String>,
    pub is_favorite: bool,
    pub user_rating: Option<u8>,
    pub watch_progress: u8,
    pub created: i64,
    pub updated: i64,
}

impl SubscriptionDTO {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            id: subscription.id,
            user_id: subscription.user_id,
            event_id: subscription.event_id,
            reminder_offsets: subscription.reminder_offsets,
            notifications_enabled: subscription.notifications_enabled,
            delivery_method: subscription.delivery_method,
            watch_status: subscription.watch_status,
            custom_title: subscription.custom_title,
            custom_notes: subscription.custom_notes,
            is_favorite: subscription.is_favorite,
            user_rating: subscription.user_rating,
            watch_progress: subscription.watch_progress,
            created: subscription.created,
            updated: subscription.updated,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ReminderDTO {
    pub id: ID,
    pub subscription_id: ID,
    pub event_id: ID,
    pub offset_minutes: i64,
    pub fire_ts: i64,
    pub state: ReminderState,
    pub generation: i64,
    pub attempts: i64,
}

impl ReminderDTO {
    pub fn new(reminder: ReminderInstance) -> Self {
        Self {
            id: reminder.id,
            subscription_id: reminder.subscription_id,
            event_id: reminder.event_id,
            offset_minutes: reminder.offset_minutes,
            fire_ts: reminder.fire_ts,
            state: reminder.state,
            generation: reminder.generation,
            attempts: reminder.attempts,
        }
    }
}
