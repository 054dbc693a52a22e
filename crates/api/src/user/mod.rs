mod upsert_user_profile;

use actix_web::web;
use upsert_user_profile::upsert_user_profile_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/integrations/users/{user_id}",
        web::put().to(upsert_user_profile_controller),
    );
}
