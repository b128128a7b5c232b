use actix_web::{HttpRequest, HttpResponse, Result, error, http, web};
use bcrypt::verify;
use serde::Deserialize;

use crate::state::app_state::AppState;
use crate::utils::jwt::{TOKEN_LIFETIME_HOURS, create_token, validate_token};

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": "Invalid credentials"
    }))
}

pub async fn login(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Username and password are required"
        })));
    }

    let config = &app_state.config;
    let (Some(secret), Some(password_hash)) = (&config.jwt_secret, &config.admin_password_hash)
    else {
        log::error!("Login attempted but JWT_SECRET or ADMIN_PASSWORD_HASH is not set");
        return Err(error::ErrorInternalServerError("Authentication is not configured"));
    };

    if req.username != config.admin_username {
        return Ok(invalid_credentials());
    }

    let password_matches = verify(&req.password, password_hash)
        .map_err(|_| error::ErrorInternalServerError("Password verification failed"))?;
    if !password_matches {
        log::warn!("Failed login for {}", req.username);
        return Ok(invalid_credentials());
    }

    let token = create_token(&req.username, secret).map_err(|e| {
        error::ErrorInternalServerError(format!("Token generation failed: {}", e))
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "token": token,
        "expiresIn": format!("{}h", TOKEN_LIFETIME_HOURS),
        "user": { "username": req.username }
    })))
}

/// Report whether the bearer token, if any, is valid.
pub async fn check_auth(req: HttpRequest, app_state: web::Data<AppState>) -> HttpResponse {
    let claims = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .zip(app_state.config.jwt_secret.as_deref())
        .and_then(|(token, secret)| validate_token(token, secret).ok());

    match claims {
        Some(claims) => HttpResponse::Ok().json(serde_json::json!({
            "isAuthenticated": true,
            "user": { "username": claims.sub }
        })),
        None => HttpResponse::Ok().json(serde_json::json!({ "isAuthenticated": false })),
    }
}

/// Tokens are stateless, so there is nothing to revoke.
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}
