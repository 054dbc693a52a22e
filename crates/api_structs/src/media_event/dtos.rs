use binge_calendar_domain::{EventKind, EventStatus, EventType, MediaEvent, Platform, ID};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaEventDTO {
    pub id: ID,
    pub title: String,
    pub description: Option<String>,
    pub event_type: EventType,
    pub details: EventKind,
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    pub timezone: Tz,
    pub platforms: Vec<Platform>,
    pub poster_url: Option<String>,
    pub status: EventStatus,
    pub version: i64,
    pub updated: i64,
}

impl MediaEventDTO {
    pub fn new(event: MediaEvent) -> Self {
        Self {
            event_type: event.event_type(),
            id: event.id,
            title: event.title,
            description: event.description,
            details: event.kind,
            start_ts: event.start_ts,
            end_ts: event.end_ts,
            timezone: event.timezone,
            platforms: event.platforms,
            poster_url: event.poster_url,
            status: event.status,
            version: event.version,
            updated: event.updated,
        }
    }
}
