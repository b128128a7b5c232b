pub mod client_info;
pub mod jwt;
pub mod short_id;
