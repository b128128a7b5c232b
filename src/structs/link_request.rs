use serde::Deserialize;
use validator::Validate;

use crate::db::store::{ListQuery, SortField, SortOrder};

pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[serde(default)]
    #[validate(url(message = "Invalid URL format. Please include http:// or https://"))]
    pub original_url: String,
    pub created_by: Option<String>,
    #[serde(default)]
    pub customization: CustomizationRequest,
    pub logo: Option<String>, // data URI or raw base64
}

/// Raw customization options as sent by the client. Normalized into
/// `Customization` before anything is rendered.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CustomizationRequest {
    pub dot_style: Option<String>,
    pub corner_square_style: Option<String>,
    pub corner_dot_style: Option<String>,
    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub gradient_type: Option<String>,
    pub gradient_start_color: Option<String>,
    pub gradient_end_color: Option<String>,
    pub logo_size: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub limit: Option<u64>,
    pub page: Option<u64>,
    pub sort_by: Option<SortField>,
    pub order: Option<SortOrder>,
    pub is_active: Option<bool>,
}

impl ListParams {
    pub fn into_query(self) -> ListQuery {
        ListQuery {
            is_active: Some(self.is_active.unwrap_or(true)),
            page: self.page.unwrap_or(1).max(1),
            limit: self.limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            sort_by: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_are_bounded() {
        let query = ListParams {
            limit: Some(500),
            page: Some(0),
            ..Default::default()
        }
        .into_query();
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.page, 1);
        assert_eq!(query.is_active, Some(true));
        assert_eq!(query.sort_by, SortField::CreatedAt);
        assert_eq!(query.order, SortOrder::Desc);
    }

    #[test]
    fn url_validation_rejects_relative_text() {
        let req: CreateLinkRequest =
            serde_json::from_value(serde_json::json!({ "originalUrl": "not-a-url" })).unwrap();
        assert!(req.validate().is_err());

        let req: CreateLinkRequest =
            serde_json::from_value(serde_json::json!({ "originalUrl": "https://example.com" }))
                .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.logo.is_none());
    }
}
