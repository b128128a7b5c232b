use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::db::store::{LinkPage, LinkStore, LinkUpdate, ListQuery, SortField, SortOrder, StoreError};
use crate::models::tracked_link::TrackedLink;

/// In-process backend. Each update runs under the entry's shard lock, so a
/// scan append is atomic with respect to other appends on the same link.
#[derive(Default)]
pub struct MemoryLinkStore {
    links: DashMap<String, TrackedLink>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
        }
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn find_one(
        &self,
        short_id: &str,
        active_only: bool,
    ) -> Result<Option<TrackedLink>, StoreError> {
        Ok(self
            .links
            .get(short_id)
            .filter(|link| !active_only || link.active)
            .map(|link| link.value().clone()))
    }

    async fn find_many(&self, query: &ListQuery) -> Result<LinkPage, StoreError> {
        let mut matching: Vec<TrackedLink> = self
            .links
            .iter()
            .filter(|entry| query.is_active.is_none_or(|active| entry.active == active))
            .map(|entry| {
                let mut link = entry.value().clone();
                link.scan_log.clear();
                link
            })
            .collect();

        matching.sort_by(|a, b| {
            let ord = match query.sort_by {
                SortField::CreatedAt => a.created_at.cmp(&b.created_at),
                SortField::Scans => a.scan_count.cmp(&b.scan_count),
            }
            .then_with(|| a.short_id.cmp(&b.short_id));
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit as usize)
            .collect();

        Ok(LinkPage { items, total })
    }

    async fn insert(&self, link: &TrackedLink) -> Result<(), StoreError> {
        match self.links.entry(link.short_id.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateId(link.short_id.clone())),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, short_id: &str, update: LinkUpdate) -> Result<bool, StoreError> {
        let Some(mut link) = self.links.get_mut(short_id) else {
            return Ok(false);
        };
        match update {
            LinkUpdate::RecordScan(scan) => link.record_scan(scan),
            LinkUpdate::Deactivate => link.deactivate(),
        }
        Ok(true)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
