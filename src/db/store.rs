use std::fmt;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::tracked_link::{ScanEvent, TrackedLink};

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The short id is already taken. Callers may retry with a fresh id.
    DuplicateId(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateId(id) => write!(f, "Short id '{}' already exists", id),
            StoreError::Backend(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Mutations a link can go through after creation.
#[derive(Debug, Clone)]
pub enum LinkUpdate {
    /// Atomically bump the counter and append to the log.
    RecordScan(ScanEvent),
    Deactivate,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    Scans,
}

impl SortField {
    pub fn field_name(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::Scans => "scans",
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub is_active: Option<bool>,
    pub page: u64, // 1-based
    pub limit: u64,
    pub sort_by: SortField,
    pub order: SortOrder,
}

impl ListQuery {
    pub fn skip(&self) -> u64 {
        self.page.saturating_sub(1) * self.limit
    }
}

/// One page of links. Items never carry their scan log.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<TrackedLink>,
    pub total: u64,
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn find_one(
        &self,
        short_id: &str,
        active_only: bool,
    ) -> Result<Option<TrackedLink>, StoreError>;

    async fn find_many(&self, query: &ListQuery) -> Result<LinkPage, StoreError>;

    /// Fails with `StoreError::DuplicateId` instead of overwriting.
    async fn insert(&self, link: &TrackedLink) -> Result<(), StoreError>;

    /// Returns whether a link with this id exists.
    async fn update(&self, short_id: &str, update: LinkUpdate) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
