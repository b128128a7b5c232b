use actix_web::HttpRequest;
use actix_web::http::header;

use crate::models::tracked_link::ScanEvent;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const COUNTRY: &str = "cf-ipcountry";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First forwarded hop, then the real-ip header, then the socket peer.
pub fn client_ip(req: &HttpRequest) -> Option<String> {
    if let Some(first) = header_value(req, FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(first.to_string());
    }
    if let Some(real) = header_value(req, REAL_IP) {
        return Some(real.to_string());
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}

/// Capture the details of a scan from the incoming request.
pub fn scan_from_request(req: &HttpRequest) -> ScanEvent {
    ScanEvent::new(
        chrono::Utc::now().timestamp_millis(),
        header_value(req, header::USER_AGENT.as_str()).map(String::from),
        client_ip(req),
        header_value(req, COUNTRY).map(String::from),
    )
}
