use actix_web::{HttpRequest, HttpResponse, Result, error, http, web};

use crate::errors::AppError;
use crate::qr::png_from_data_uri;
use crate::services::links;
use crate::state::app_state::AppState;
use crate::structs::link_request::{CreateLinkRequest, ListParams};
use crate::structs::link_response::{
    LinkDetail, LinkListResponse, LinkSummary, Pagination, StatsResponse,
};

/// Create a tracked link and its QR image
pub async fn generate_qr(
    app_state: web::Data<AppState>,
    web::Json(req): web::Json<CreateLinkRequest>,
) -> Result<HttpResponse> {
    let link = links::create_link(
        app_state.store.as_ref(),
        &app_state.config.base_url,
        req,
    )
    .await?;

    app_state.cache.clear();

    Ok(HttpResponse::Created().json(serde_json::json!({
        "success": true,
        "data": LinkDetail::from(link)
    })))
}

/// Page through links, newest first unless asked otherwise
pub async fn list_qr_codes(
    req: HttpRequest,
    app_state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> Result<HttpResponse> {
    let cache_key = req.uri().to_string();
    if let Some(cached) = app_state.cache.get(&cache_key) {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let query = params.into_inner().into_query();
    let page = links::list_links(app_state.store.as_ref(), &query).await?;

    let body = LinkListResponse {
        success: true,
        data: page.items.into_iter().map(LinkSummary::from).collect(),
        pagination: Pagination::new(page.total, query.page, query.limit),
    };
    let body = serde_json::to_value(&body)
        .map_err(|e| error::ErrorInternalServerError(format!("Serialization error: {}", e)))?;

    app_state.cache.insert(cache_key, body.clone());
    Ok(HttpResponse::Ok().json(body))
}

pub async fn get_qr_code(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let link = links::get_link(app_state.store.as_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": LinkDetail::from(link)
    })))
}

/// Raw PNG of the stored QR code
pub async fn get_qr_image(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let link = links::get_link(app_state.store.as_ref(), &path.into_inner()).await?;
    let png = png_from_data_uri(&link.image)
        .ok_or_else(|| AppError::Render(format!("Stored image for {} is not a PNG", link.short_id)))?;

    Ok(HttpResponse::Ok()
        .content_type("image/png")
        .insert_header((http::header::CACHE_CONTROL, "public, max-age=86400"))
        .body(png))
}

pub async fn get_qr_stats(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let (stats, created_at) =
        links::link_stats(app_state.store.as_ref(), &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": StatsResponse { stats, created_at }
    })))
}

/// Soft delete
pub async fn delete_qr_code(
    app_state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    links::deactivate_link(app_state.store.as_ref(), &path.into_inner()).await?;
    app_state.cache.clear();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "QR code deleted successfully"
    })))
}
