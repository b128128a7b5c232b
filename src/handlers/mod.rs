pub mod auth_handlers;
pub mod health_handlers;
pub mod link_handlers;
pub mod track_handlers;
