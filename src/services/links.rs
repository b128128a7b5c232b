use actix_web::web;
use validator::Validate;

use crate::db::store::{LinkPage, LinkStore, LinkUpdate, ListQuery, StoreError};
use crate::errors::AppError;
use crate::models::customization::Customization;
use crate::models::tracked_link::{TrackedLink, tracking_url};
use crate::qr::{RenderOptions, render_qr};
use crate::services::analytics::{ScanStats, summarize};
use crate::structs::link_request::CreateLinkRequest;
use crate::utils::short_id::generate_short_id;

/// Fresh ids tried before creation gives up on collisions.
pub const MAX_ID_ATTEMPTS: usize = 3;

const NOT_FOUND: &str = "QR code not found";
const INVALID_URL: &str = "Invalid URL format. Please include http:// or https://";

/// Validate the request, render the QR for a fresh tracking URL and persist
/// the link. Nothing is stored unless the image rendered.
pub async fn create_link(
    store: &dyn LinkStore,
    base_url: &str,
    req: CreateLinkRequest,
) -> Result<TrackedLink, AppError> {
    // stored byte for byte, so surrounding whitespace fails the scheme check
    if req.original_url.trim().is_empty() {
        return Err(AppError::validation("Original URL is required"));
    }
    req.validate()?;
    if !(req.original_url.starts_with("http://") || req.original_url.starts_with("https://")) {
        return Err(AppError::validation(INVALID_URL));
    }

    let CreateLinkRequest {
        original_url,
        created_by,
        customization,
        logo,
    } = req;

    let logo = logo.filter(|l| !l.trim().is_empty());
    let customization = Customization::from_request(&customization, logo.is_some())?;
    let options = RenderOptions::from_customization(&customization, logo)?;

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let short_id = generate_short_id();
        let tracking = tracking_url(base_url, &short_id);

        let data = tracking.clone();
        let render_options = options.clone();
        let image = web::block(move || render_qr(&data, &render_options)).await??;
        log::debug!(
            "Rendered {}x{} QR for {}",
            image.width,
            image.height,
            tracking
        );

        let link = TrackedLink::new(
            short_id,
            original_url.clone(),
            tracking,
            image.to_data_uri(),
            customization.clone(),
            created_by.clone(),
        );

        match store.insert(&link).await {
            Ok(()) => {
                log::info!("Created link {} -> {}", link.short_id, link.original_url);
                return Ok(link);
            }
            Err(StoreError::DuplicateId(id)) => {
                log::warn!(
                    "Short id {} already taken (attempt {}/{})",
                    id,
                    attempt,
                    MAX_ID_ATTEMPTS
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::persistence(format!(
        "Could not allocate a unique short id after {} attempts",
        MAX_ID_ATTEMPTS
    )))
}

/// Active link by id, with its full scan log.
pub async fn get_link(store: &dyn LinkStore, short_id: &str) -> Result<TrackedLink, AppError> {
    store
        .find_one(short_id, true)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

pub async fn link_stats(
    store: &dyn LinkStore,
    short_id: &str,
) -> Result<(ScanStats, i64), AppError> {
    let link = get_link(store, short_id).await?;
    Ok((summarize(&link.scan_log), link.created_at))
}

/// Soft delete. The record stays, it just stops resolving.
pub async fn deactivate_link(store: &dyn LinkStore, short_id: &str) -> Result<(), AppError> {
    if store.update(short_id, LinkUpdate::Deactivate).await? {
        log::info!("Deactivated link {}", short_id);
        Ok(())
    } else {
        Err(AppError::not_found(NOT_FOUND))
    }
}

pub async fn list_links(store: &dyn LinkStore, query: &ListQuery) -> Result<LinkPage, AppError> {
    Ok(store.find_many(query).await?)
}
