use crate::shared::entity::{Entity, ID};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A canonical catalog entry for something that airs: an episode,
/// a movie release, a match or a special.
///
/// `MediaEvent`s are written by catalog ingestion only. Every write
/// carries a `version` that is strictly increasing per event, and
/// `ReminderInstance`s are tagged with the version they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub id: ID,
    pub title: String,
    pub description: Option<String>,
    pub kind: EventKind,
    /// Absolute start instant in millis since epoch
    pub start_ts: i64,
    pub end_ts: Option<i64>,
    /// The time zone the event is announced in
    pub timezone: Tz,
    pub platforms: Vec<Platform>,
    pub poster_url: Option<String>,
    pub status: EventStatus,
    pub version: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    TvShow,
    Movie,
    Sports,
    Special,
}

text_enum!(EventType {
    TvShow => "tv_show",
    Movie => "movie",
    Sports => "sports",
    Special => "special",
});

/// The type specific details of a `MediaEvent`. The variant is the
/// event type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    #[serde(rename_all = "camelCase")]
    TvShow {
        series_name: String,
        season_number: Option<u32>,
        episode_number: Option<u32>,
        episode_title: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Movie {
        director: Option<String>,
        runtime_minutes: Option<u32>,
        release_type: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Sports {
        sport_type: String,
        league: Option<String>,
        venue: Option<String>,
        teams: Option<Teams>,
    },
    #[serde(rename_all = "camelCase")]
    Special { description: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teams {
    pub home: String,
    pub away: String,
}

/// Where an event can be watched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Platform {
    Streaming { service: String },
    Broadcast { network: String },
    Theatrical,
}

impl Platform {
    pub fn name(&self) -> &str {
        match self {
            Self::Streaming { service } => service,
            Self::Broadcast { network } => network,
            Self::Theatrical => "theaters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
    Postponed,
}

text_enum!(EventStatus {
    Confirmed => "confirmed",
    Tentative => "tentative",
    Cancelled => "cancelled",
    Postponed => "postponed",
});

#[derive(Error, Debug, PartialEq)]
pub enum InvalidEventError {
    #[error("The event title can not be empty")]
    EmptyTitle,
    #[error("The event ends before it starts")]
    EndsBeforeStart,
    #[error("The event version must be a positive number, got: {0}")]
    InvalidVersion(i64),
    #[error("The {0} is missing")]
    MissingDetail(&'static str),
    #[error("The {0} instant {1} is outside of the supported range")]
    OutOfRange(&'static str, i64),
}

/// Earliest supported instant in millis, 0001-01-01T00:00:00Z
pub const EARLIEST_EVENT_TS: i64 = -62_135_596_800_000;
/// Latest supported instant in millis, 9999-12-31T23:59:59.999Z
pub const LATEST_EVENT_TS: i64 = 253_402_300_799_999;

fn in_range(ts: i64) -> bool {
    (EARLIEST_EVENT_TS..=LATEST_EVENT_TS).contains(&ts)
}

impl Entity for MediaEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::TvShow { .. } => EventType::TvShow,
            Self::Movie { .. } => EventType::Movie,
            Self::Sports { .. } => EventType::Sports,
            Self::Special { .. } => EventType::Special,
        }
    }
}

impl MediaEvent {
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// Whether reminders should be scheduled for this event. Postponed
    /// events have no reliable start so they are treated as cancelled.
    pub fn is_schedulable(&self) -> bool {
        matches!(self.status, EventStatus::Confirmed | EventStatus::Tentative)
    }

    /// Instant in millis a reminder `offset_minutes` before the start is due
    pub fn reminder_fire_ts(&self, offset_minutes: i64) -> i64 {
        self.start_ts
            .saturating_sub(offset_minutes.saturating_mul(60 * 1000))
    }

    pub fn validate(&self) -> Result<(), InvalidEventError> {
        if self.title.trim().is_empty() {
            return Err(InvalidEventError::EmptyTitle);
        }
        if !in_range(self.start_ts) {
            return Err(InvalidEventError::OutOfRange("start", self.start_ts));
        }
        if let Some(end_ts) = self.end_ts {
            if !in_range(end_ts) {
                return Err(InvalidEventError::OutOfRange("end", end_ts));
            }
            if end_ts < self.start_ts {
                return Err(InvalidEventError::EndsBeforeStart);
            }
        }
        if self.version < 1 {
            return Err(InvalidEventError::InvalidVersion(self.version));
        }
        match &self.kind {
            EventKind::TvShow { series_name, .. } if series_name.trim().is_empty() => {
                Err(InvalidEventError::MissingDetail("series name"))
            }
            EventKind::Sports { sport_type, .. } if sport_type.trim().is_empty() => {
                Err(InvalidEventError::MissingDetail("sport type"))
            }
            _ => Ok(()),
        }
    }

    /// Human readable headline, e.g. `The Office S02E05: Halloween`
    /// or `Arsenal vs Chelsea`.
    pub fn headline(&self) -> String {
        match &self.kind {
            EventKind::TvShow {
                series_name,
                season_number,
                episode_number,
                episode_title,
            } => {
                let mut headline = series_name.clone();
                match (season_number, episode_number) {
                    (Some(s), Some(e)) => headline.push_str(&format!(" S{:02}E{:02}", s, e)),
                    (Some(s), None) => headline.push_str(&format!(" S{:02}", s)),
                    (None, Some(e)) => headline.push_str(&format!(" E{:02}", e)),
                    (None, None) => {}
                }
                match episode_title {
                    Some(episode_title) => format!("{}: {}", headline, episode_title),
                    None if headline == self.title => headline,
                    None => format!("{}: {}", headline, self.title),
                }
            }
            EventKind::Sports {
                teams: Some(teams), ..
            } => format!("{} vs {}", teams.home, teams.away),
            _ => self.title.clone(),
        }
    }
}
