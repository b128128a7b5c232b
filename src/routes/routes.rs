use actix_web::web;

use crate::handlers::auth_handlers::{check_auth, login, logout};
use crate::handlers::health_handlers::{health_check, index, not_found};
use crate::handlers::link_handlers::{
    delete_qr_code, generate_qr, get_qr_code, get_qr_image, get_qr_stats, list_qr_codes,
};
use crate::handlers::track_handlers::track_scan;

/// Configure the routes
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
    // Public redirect, encoded in every QR image
    cfg.route("/track/{short_id}", web::get().to(track_scan));
    cfg.route("/api/health", web::get().to(health_check));
    cfg.service(
        web::scope("/api/auth")
            .route("/login", web::post().to(login))
            .route("/check", web::get().to(check_auth))
            .route("/logout", web::post().to(logout)),
    );
    // Fixed segments first so they are not taken for ids
    cfg.service(
        web::scope("/api/qr")
            .route("/generate", web::post().to(generate_qr))
            .route("/list", web::get().to(list_qr_codes))
            .route("/stats/{short_id}", web::get().to(get_qr_stats))
            .route("/{short_id}/image", web::get().to(get_qr_image))
            .route("/{short_id}", web::get().to(get_qr_code))
            .route("/{short_id}", web::delete().to(delete_qr_code)),
    );
    cfg.default_service(web::to(not_found));
}
