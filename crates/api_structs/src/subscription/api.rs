use crate::dtos::{ReminderDTO, SubscriptionDTO};
use binge_calendar_domain::{
    DeliveryMethod, ReminderInstance, Subscription, WatchStatus, ID,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionDTO,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription) -> Self {
        Self {
            subscription: SubscriptionDTO::new(subscription),
        }
    }
}

#[derive(Deserialize)]
pub struct SubscriptionPathParams {
    pub subscription_id: ID,
}

pub mod add_subscription {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub event_id: ID,
        #[serde(default)]
        pub reminder_offsets: Vec<i64>,
        #[serde(default)]
        pub notifications_enabled: Option<bool>,
        #[serde(default)]
        pub delivery_method: Option<DeliveryMethod>,
        #[serde(default)]
        pub watch_status: Option<WatchStatus>,
        #[serde(default)]
        pub custom_title: Option<String>,
        #[serde(default)]
        pub custom_notes: Option<String>,
        #[serde(default)]
        pub is_favorite: Option<bool>,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod update_subscription {
    use super::*;

    pub type PathParams = SubscriptionPathParams;

    /// Fields left out are kept as they are
    #[derive(Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        #[serde(default)]
        pub reminder_offsets: Option<Vec<i64>>,
        #[serde(default)]
        pub notifications_enabled: Option<bool>,
        #[serde(default)]
        pub delivery_method: Option<DeliveryMethod>,
        #[serde(default)]
        pub watch_status: Option<WatchStatus>,
        #[serde(default)]
        pub custom_title: Option<String>,
        #[serde(default)]
        pub custom_notes: Option<String>,
        #[serde(default)]
        pub is_favorite: Option<bool>,
        #[serde(default)]
        pub user_rating: Option<u8>,
        #[serde(default)]
        pub watch_progress: Option<u8>,
    }

    pub type APIResponse = SubscriptionResponse;
}

pub mod remove_subscription {
    use super::*;

    pub type PathParams = SubscriptionPathParams;

    pub type APIResponse = SubscriptionResponse;
}

pub mod get_subscription {
    use super::*;

    pub type PathParams = SubscriptionPathParams;

    pub type APIResponse = SubscriptionResponse;
}

pub mod list_subscriptions {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub subscriptions: Vec<SubscriptionDTO>,
    }

    impl APIResponse {
        pub fn new(subscriptions: Vec<Subscription>) -> Self {
            Self {
                subscriptions: subscriptions.into_iter().map(SubscriptionDTO::new).collect(),
            }
        }
    }
}

pub mod get_subscription_reminders {
    use super::*;

    pub type PathParams = SubscriptionPathParams;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub reminders: Vec<ReminderDTO>,
    }

    impl APIResponse {
        pub fn new(reminders: Vec<ReminderInstance>) -> Self {
            Self {
                reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
            }
        }
    }
}
