mod get_notifications;
mod mark_notification_read;

use actix_web::web;
use get_notifications::get_notifications_controller;
use mark_notification_read::mark_notification_read_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/me/notifications",
        web::get().to(get_notifications_controller),
    );
    cfg.route(
        "/me/notifications/{notification_id}/read",
        web::put().to(mark_notification_read_controller),
    );
}
