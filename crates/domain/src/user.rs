use crate::shared::entity::{Entity, ID};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// What the core knows about a user. The identity and billing
/// collaborators own this data, the core only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub id: ID,
    pub tier: SubscriptionTier,
    /// Time zone reminder messages are rendered in
    pub timezone: Tz,
    pub updated: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Free,
    Pro,
}

text_enum!(SubscriptionTier {
    Free => "free",
    Pro => "pro",
});

impl Default for SubscriptionTier {
    fn default() -> Self {
        Self::Free
    }
}

impl UserProfile {
    /// Profile of a user the collaborators have not told us about yet
    pub fn new(id: ID) -> Self {
        Self {
            id,
            tier: SubscriptionTier::Free,
            timezone: Tz::UTC,
            updated: 0,
        }
    }
}

impl Entity for UserProfile {
    fn id(&self) -> &ID {
        &self.id
    }
}
