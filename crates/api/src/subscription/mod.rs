mod add_subscription;
mod get_subscription;
mod get_subscription_reminders;
mod list_subscriptions;
pub mod remove_subscription;
mod subscribers;
pub mod sync_subscription_reminders;
mod update_subscription;

use actix_web::web;
use add_subscription::add_subscription_controller;
use binge_calendar_domain::{SubscriptionTier, UserProfile};
use binge_calendar_infra::Config;
use get_subscription::get_subscription_controller;
use get_subscription_reminders::get_subscription_reminders_controller;
use list_subscriptions::list_subscriptions_controller;
use remove_subscription::remove_subscription_controller;
use update_subscription::update_subscription_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/me/subscriptions",
        web::post().to(add_subscription_controller),
    );
    cfg.route(
        "/me/subscriptions",
        web::get().to(list_subscriptions_controller),
    );
    cfg.route(
        "/me/subscriptions/{subscription_id}",
        web::get().to(get_subscription_controller),
    );
    cfg.route(
        "/me/subscriptions/{subscription_id}",
        web::put().to(update_subscription_controller),
    );
    cfg.route(
        "/me/subscriptions/{subscription_id}",
        web::delete().to(remove_subscription_controller),
    );
    cfg.route(
        "/me/subscriptions/{subscription_id}/reminders",
        web::get().to(get_subscription_reminders_controller),
    );
}

/// How many reminder offsets the user may set per event
fn reminder_limit(profile: &UserProfile, config: &Config) -> usize {
    match profile.tier {
        SubscriptionTier::Free => config.free_tier_reminder_limit,
        SubscriptionTier::Pro => config.reminder_limit,
    }
}
