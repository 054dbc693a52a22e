use crate::shared::entity::{Entity, ID};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest allowed reminder offset: one week before the event starts
pub const MAX_REMINDER_OFFSET_MINUTES: i64 = 60 * 24 * 7;

/// A user's attachment to a `MediaEvent` in the catalog together with
/// how the user has customized it.
///
/// There is at most one `Subscription` per (user, event) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub id: ID,
    pub user_id: ID,
    pub event_id: ID,
    /// Minutes before the event start to remind the user. Unique and
    /// ordered from the earliest reminder to the latest.
    pub reminder_offsets: Vec<i64>,
    pub notifications_enabled: bool,
    pub delivery_method: DeliveryMethod,
    pub watch_status: WatchStatus,
    pub custom_title: Option<String>,
    pub custom_notes: Option<String>,
    pub is_favorite: bool,
    pub user_rating: Option<u8>,
    /// Percentage watched
    pub watch_progress: u8,
    pub created: i64,
    pub updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Planning,
    Watching,
    Completed,
    Dropped,
    OnHold,
}

text_enum!(WatchStatus {
    Planning => "planning",
    Watching => "watching",
    Completed => "completed",
    Dropped => "dropped",
    OnHold => "on_hold",
});

impl Default for WatchStatus {
    fn default() -> Self {
        Self::Planning
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    InApp,
    Email,
    Push,
    Webhook,
}

text_enum!(DeliveryMethod {
    InApp => "in_app",
    Email => "email",
    Push => "push",
    Webhook => "webhook",
});

impl Default for DeliveryMethod {
    fn default() -> Self {
        Self::InApp
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidSubscriptionError {
    #[error(
        "Reminder offset of {0} minutes is not between 0 and {max} minutes",
        max = MAX_REMINDER_OFFSET_MINUTES
    )]
    InvalidReminderOffset(i64),
    #[error("Reminder offset of {0} minutes was given more than once")]
    DuplicateReminderOffset(i64),
    #[error("At most {limit} reminders are allowed per event, got: {given}")]
    TooManyReminders { limit: usize, given: usize },
    #[error("Rating must be between 1 and 10, got: {0}")]
    InvalidRating(u8),
    #[error("Watch progress must be a percentage, got: {0}")]
    InvalidWatchProgress(u8),
}

/// Validates reminder offsets given by a user and returns them in
/// the order they are stored in.
pub fn normalize_reminder_offsets(
    offsets: &[i64],
    limit: usize,
) -> Result<Vec<i64>, InvalidSubscriptionError> {
    if let Some(offset) = offsets
        .iter()
        .find(|offset| **offset < 0 || **offset > MAX_REMINDER_OFFSET_MINUTES)
    {
        return Err(InvalidSubscriptionError::InvalidReminderOffset(*offset));
    }
    if let Some(offset) = offsets.iter().duplicates().next() {
        return Err(InvalidSubscriptionError::DuplicateReminderOffset(*offset));
    }
    if offsets.len() > limit {
        return Err(InvalidSubscriptionError::TooManyReminders {
            limit,
            given: offsets.len(),
        });
    }

    Ok(offsets.iter().copied().sorted_by(|a, b| b.cmp(a)).collect())
}

impl Subscription {
    pub fn new(user_id: ID, event_id: ID, now: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            event_id,
            reminder_offsets: Vec::new(),
            notifications_enabled: true,
            delivery_method: Default::default(),
            watch_status: Default::default(),
            custom_title: None,
            custom_notes: None,
            is_favorite: false,
            user_rating: None,
            watch_progress: 0,
            created: now,
            updated: now,
        }
    }

    pub fn set_reminder_offsets(
        &mut self,
        offsets: &[i64],
        limit: usize,
    ) -> Result<(), InvalidSubscriptionError> {
        self.reminder_offsets = normalize_reminder_offsets(offsets, limit)?;
        Ok(())
    }

    pub fn set_user_rating(&mut self, rating: Option<u8>) -> Result<(), InvalidSubscriptionError> {
        match rating {
            Some(rating) if !(1..=10).contains(&rating) => {
                Err(InvalidSubscriptionError::InvalidRating(rating))
            }
            _ => {
                self.user_rating = rating;
                Ok(())
            }
        }
    }

    pub fn set_watch_progress(&mut self, progress: u8) -> Result<(), InvalidSubscriptionError> {
        if progress > 100 {
            return Err(InvalidSubscriptionError::InvalidWatchProgress(progress));
        }
        self.watch_progress = progress;
        Ok(())
    }
}

impl Entity for Subscription {
    fn id(&self) -> &ID {
        &self.id
    }
}
