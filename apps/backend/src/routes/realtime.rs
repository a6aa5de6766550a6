//! WebSocket upgrade route for push-mode board watching.

use actix_web::web;

use crate::ws::session::upgrade;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws/boards/{code}").route(web::get().to(upgrade)));
}
