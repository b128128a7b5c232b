pub mod app_state;
pub mod response_cache;
