use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse, web};

use crate::errors::AppError;
use crate::state::app_state::AppState;
use crate::utils::client_info::scan_from_request;

/// Redirect a scan to its destination. The scan is recorded in the
/// background after the response is built.
pub async fn track_scan(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let short_id = path.into_inner();

    match app_state.tracker.resolve(&short_id).await {
        Ok(resolved) => {
            let scan = scan_from_request(&req);
            log::info!("Scan: {} -> {}", short_id, resolved.destination);
            // detached, the redirect never waits on it
            let _ = resolved.recorder.record(scan);

            HttpResponse::MovedPermanently()
                .append_header((header::LOCATION, resolved.destination))
                .finish()
        }
        Err(AppError::NotFound(_)) => HttpResponse::NotFound()
            .content_type(ContentType::html())
            .body(not_found_page(&short_id)),
        Err(e) => {
            log::error!("Track error for {}: {}", short_id, e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body(error_page())
        }
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const PAGE_STYLE: &str = "body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;\
display:flex;align-items:center;justify-content:center;min-height:100vh;margin:0;\
background:linear-gradient(135deg,#667eea 0%,#764ba2 100%)}\
.card{background:#fff;padding:40px;border-radius:20px;text-align:center;max-width:500px}\
h1{color:#e74c3c}p{color:#666}code{background:#f7f7f7;padding:8px;border-radius:8px}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\
<title>{title}</title><style>{style}</style></head>\
<body><div class=\"card\">{body}</div></body></html>",
        title = title,
        style = PAGE_STYLE,
        body = body
    )
}

fn not_found_page(short_id: &str) -> String {
    page(
        "QR Code Not Found",
        &format!(
            "<h1>QR Code Not Found</h1><p>This QR code does not exist or has been deleted.</p>\
<code>ID: {}</code>",
            escape_html(short_id)
        ),
    )
}

fn error_page() -> String {
    page(
        "Error",
        "<h1>Something went wrong</h1><p>We could not process this QR code. Please try again later.</p>\
<a href=\"/\">Go Home</a>",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<script>alert('x')</script>&"),
            "&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;&amp;"
        );
    }

    #[test]
    fn not_found_page_echoes_the_id_safely() {
        let html = not_found_page("<b>id</b>");
        assert!(html.contains("ID: &lt;b&gt;id&lt;/b&gt;"));
        assert!(!html.contains("<b>id</b>"));
    }
}
