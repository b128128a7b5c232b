use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::db::store::{LinkStore, LinkUpdate};
use crate::errors::AppError;
use crate::models::tracked_link::ScanEvent;

/// Resolves short ids to destinations and hands out a detached scan recorder.
#[derive(Clone)]
pub struct RedirectTracker {
    store: Arc<dyn LinkStore>,
}

pub struct Resolved {
    pub destination: String,
    pub recorder: ScanRecorder,
}

/// Appends one scan to a resolved link, off the request path.
pub struct ScanRecorder {
    store: Arc<dyn LinkStore>,
    short_id: String,
}

impl RedirectTracker {
    pub fn new(store: Arc<dyn LinkStore>) -> Self {
        Self { store }
    }

    /// Unknown and deactivated ids both come back as `NotFound`.
    pub async fn resolve(&self, short_id: &str) -> Result<Resolved, AppError> {
        let link = self
            .store
            .find_one(short_id, true)
            .await?
            .ok_or_else(|| AppError::not_found("QR code not found"))?;

        Ok(Resolved {
            destination: link.original_url,
            recorder: ScanRecorder {
                store: Arc::clone(&self.store),
                short_id: link.short_id,
            },
        })
    }
}

impl ScanRecorder {
    /// Spawn the append. Failures are logged and never reach the visitor.
    pub fn record(self, scan: ScanEvent) -> JoinHandle<()> {
        actix_web::rt::spawn(async move {
            match self
                .store
                .update(&self.short_id, LinkUpdate::RecordScan(scan))
                .await
            {
                Ok(true) => log::debug!("Recorded scan for {}", self.short_id),
                Ok(false) => log::warn!("Dropped scan for {}, link is gone", self.short_id),
                Err(e) => log::error!("Failed to record scan for {}: {}", self.short_id, e),
            }
        })
    }
}
