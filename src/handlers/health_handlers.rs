use actix_web::{HttpRequest, HttpResponse, web};

use crate::state::app_state::AppState;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "QR Code Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "health": "GET /api/health",
            "generateQR": "POST /api/qr/generate",
            "listQR": "GET /api/qr/list",
            "getQR": "GET /api/qr/:id",
            "qrImage": "GET /api/qr/:id/image",
            "deleteQR": "DELETE /api/qr/:id",
            "stats": "GET /api/qr/stats/:id",
            "track": "GET /track/:shortId"
        }
    }))
}

pub async fn health_check(app_state: web::Data<AppState>) -> HttpResponse {
    let now = chrono::Utc::now();
    let uptime = (now.timestamp_millis() - app_state.started_at) as f64 / 1000.0;

    match app_state.store.ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "OK",
            "timestamp": now.to_rfc3339(),
            "uptime": uptime
        })),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "ERROR",
                "timestamp": now.to_rfc3339(),
                "uptime": uptime,
                "error": "Database connection failed"
            }))
        }
    }
}

/// Fallback for unmatched routes
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Route not found",
        "path": req.path(),
        "method": req.method().as_str()
    }))
}
