use serde::Serialize;

use crate::models::customization::Customization;
use crate::models::tracked_link::{ScanEvent, TrackedLink};
use crate::services::analytics::ScanStats;

/// List view of a link, without its scan history.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub short_id: String,
    pub original_url: String,
    pub tracking_url: String,
    pub qr_code_image: String,
    pub customization: Customization,
    pub scans: i64,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<TrackedLink> for LinkSummary {
    fn from(link: TrackedLink) -> Self {
        Self {
            short_id: link.short_id,
            original_url: link.original_url,
            tracking_url: link.tracking_url,
            qr_code_image: link.image,
            customization: link.customization,
            scans: link.scan_count,
            is_active: link.active,
            created_by: link.created_by,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Single-link view with the full scan history. The record id goes out as a
/// plain hex string.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetail {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub summary: LinkSummary,
    pub scan_history: Vec<ScanEvent>,
}

impl From<TrackedLink> for LinkDetail {
    fn from(mut link: TrackedLink) -> Self {
        let id = link.id.take().map(|oid| oid.to_hex());
        let scan_history = std::mem::take(&mut link.scan_log);
        Self {
            id,
            summary: link.into(),
            scan_history,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub limit: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            pages: total.div_ceil(limit.max(1)),
            limit,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct LinkListResponse {
    pub success: bool,
    pub data: Vec<LinkSummary>,
    pub pagination: Pagination,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: ScanStats,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn link() -> TrackedLink {
        let mut link = TrackedLink::new(
            "a1b2c3d4e5f6".into(),
            "https://example.com".into(),
            "http://localhost:5000/track/a1b2c3d4e5f6".into(),
            "data:image/png;base64,".into(),
            Customization::default(),
            None,
        );
        link.record_scan(ScanEvent::new(5, Some("agent".into()), None, None));
        link
    }

    #[test]
    fn detail_renders_id_as_hex_string() {
        let oid = ObjectId::new();
        let mut link = link();
        link.id = Some(oid);

        let json = serde_json::to_value(LinkDetail::from(link)).unwrap();
        assert_eq!(json["_id"], oid.to_hex());
        assert_eq!(json["_id"].as_str().unwrap().len(), 24);
        assert_eq!(json["shortId"], "a1b2c3d4e5f6");
        assert_eq!(json["scans"], 1);
        assert_eq!(json["isActive"], true);
        assert_eq!(json["qrCodeImage"], "data:image/png;base64,");
        assert_eq!(json["scanHistory"][0]["userAgent"], "agent");
    }

    #[test]
    fn detail_without_id_omits_it() {
        let json = serde_json::to_value(LinkDetail::from(link())).unwrap();
        assert!(json.get("_id").is_none());
        assert_eq!(json["scanHistory"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn pages_round_up() {
        assert_eq!(Pagination::new(0, 1, 100).pages, 0);
        assert_eq!(Pagination::new(100, 1, 100).pages, 1);
        assert_eq!(Pagination::new(101, 2, 100).pages, 2);
    }
}
