pub mod link_request;
pub mod link_response;
