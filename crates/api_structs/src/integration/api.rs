use crate::dtos::MediaEventDTO;
use binge_calendar_domain::{
    EventKind, EventStatus, MediaEvent, Platform, SubscriptionTier, UserProfile, ID,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub mod upsert_event {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub title: String,
        #[serde(default)]
        pub description: Option<String>,
        pub details: EventKind,
        pub start_ts: i64,
        #[serde(default)]
        pub end_ts: Option<i64>,
        pub timezone: Tz,
        #[serde(default)]
        pub platforms: Vec<Platform>,
        #[serde(default)]
        pub poster_url: Option<String>,
        pub status: EventStatus,
        /// Must grow with every write of the event
        pub version: i64,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// The stored event, which is the previous one if this write was stale
        pub event: MediaEventDTO,
        pub applied: bool,
    }

    impl APIResponse {
        pub fn new(event: MediaEvent, applied: bool) -> Self {
            Self {
                event: MediaEventDTO::new(event),
                applied,
            }
        }
    }
}

pub mod delete_event {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub event_id: ID,
    }

    pub type APIResponse = crate::MediaEventResponse;
}

pub mod upsert_user_profile {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub user_id: ID,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub tier: SubscriptionTier,
        pub timezone: Tz,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub user_id: ID,
        pub tier: SubscriptionTier,
        pub timezone: Tz,
        pub updated: i64,
    }

    impl APIResponse {
        pub fn new(user: UserProfile) -> Self {
            Self {
                user_id: user.id,
                tier: user.tier,
                timezone: user.timezone,
                updated: user.updated,
            }
        }
    }
}
