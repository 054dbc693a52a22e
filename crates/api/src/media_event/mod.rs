mod delete_event;
mod get_event;
mod subscribers;
mod sync_event_reminders;
mod upsert_event;

use actix_web::web;
use delete_event::delete_event_controller;
use get_event::get_event_controller;
use upsert_event::upsert_event_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events/{event_id}", web::get().to(get_event_controller));

    cfg.route(
        "/integrations/events/{event_id}",
        web::put().to(upsert_event_controller),
    );
    cfg.route(
        "/integrations/events/{event_id}",
        web::delete().to(delete_event_controller),
    );
}
