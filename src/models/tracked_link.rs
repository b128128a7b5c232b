use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::customization::Customization;

pub const UNKNOWN: &str = "Unknown";
pub const ANONYMOUS: &str = "anonymous";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanLocation {
    pub country: String,
    pub city: String, // never resolved, always "Unknown"
}

/// One resolution of a tracking URL.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanEvent {
    pub timestamp: i64, // capture time in milliseconds
    pub user_agent: String,
    #[serde(rename = "ip")]
    pub source_ip: String,
    pub location: ScanLocation,
}

impl ScanEvent {
    pub fn new(
        timestamp: i64,
        user_agent: Option<String>,
        source_ip: Option<String>,
        country: Option<String>,
    ) -> Self {
        let or_unknown = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_string())
        };
        Self {
            timestamp,
            user_agent: or_unknown(user_agent),
            source_ip: or_unknown(source_ip),
            location: ScanLocation {
                country: or_unknown(country),
                city: UNKNOWN.to_string(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TrackedLink {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub short_id: String,
    pub original_url: String,
    pub tracking_url: String,
    #[serde(rename = "qrCodeImage")]
    pub image: String, // PNG data URI
    #[serde(default)]
    pub customization: Customization,
    #[serde(rename = "scans", default)]
    pub scan_count: i64,
    #[serde(rename = "scanHistory", default)]
    pub scan_log: Vec<ScanEvent>,
    #[serde(rename = "isActive")]
    pub active: bool,
    #[serde(default = "default_created_by")]
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_created_by() -> String {
    ANONYMOUS.to_string()
}

impl TrackedLink {
    pub fn new(
        short_id: String,
        original_url: String,
        tracking_url: String,
        image: String,
        customization: Customization,
        created_by: Option<String>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();

        Self {
            id: None,
            short_id,
            original_url,
            tracking_url,
            image,
            customization,
            scan_count: 0,
            scan_log: Vec::new(),
            active: true,
            created_by: created_by
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(default_created_by),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a scan keeping the log ordered by timestamp. Equal timestamps
    /// keep arrival order.
    pub fn record_scan(&mut self, scan: ScanEvent) {
        let at = self
            .scan_log
            .partition_point(|s| s.timestamp <= scan.timestamp);
        self.scan_log.insert(at, scan);
        self.scan_count += 1;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

/// Build the public tracking URL for a short id.
pub fn tracking_url(base_url: &str, short_id: &str) -> String {
    format!("{}/track/{}", base_url.trim_end_matches('/'), short_id)
}
