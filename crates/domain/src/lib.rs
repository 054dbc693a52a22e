#[macro_use]
mod shared;
mod event;
mod materializer;
mod notification;
mod reminder;
mod subscription;
mod user;

pub use event::{EventKind, EventStatus, EventType, InvalidEventError, MediaEvent, Platform, Teams};
pub use materializer::{materialize_reminders, ReminderPlan};
pub use notification::{render_reminder, NotificationKind, NotificationRecord, RenderedMessage};
pub use reminder::{ReminderInstance, ReminderState};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use shared::text_enum::UnknownVariantError;
pub use subscription::{
    normalize_reminder_offsets, DeliveryMethod, InvalidSubscriptionError, Subscription,
    WatchStatus, MAX_REMINDER_OFFSET_MINUTES,
};
pub use user::{SubscriptionTier, UserProfile};
