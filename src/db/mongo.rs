use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Document, doc, to_bson};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};

use crate::db::store::{LinkPage, LinkStore, LinkUpdate, ListQuery, SortOrder, StoreError};
use crate::models::tracked_link::TrackedLink;

const COLLECTION: &str = "qrcodes";
const DUPLICATE_KEY: i32 = 11000;

pub async fn get_database(uri: &str, name: &str) -> mongodb::error::Result<Database> {
    let client = Client::with_uri_str(uri).await?;
    let db = client.database(name);
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(db)
}

pub struct MongoLinkStore {
    db: Database,
    links: Collection<TrackedLink>,
}

impl MongoLinkStore {
    /// Wrap a database handle and make sure `shortId` is a unique key.
    pub async fn new(db: Database) -> Result<Self, StoreError> {
        let links = db.collection::<TrackedLink>(COLLECTION);

        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "shortId": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "scans": -1 }).build(),
        ];
        links.create_indexes(indexes).await.map_err(backend)?;

        Ok(Self { db, links })
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// Update document for one mutation. A scan bumps the counter and lands in
/// the sorted log within a single document write, so the two never diverge.
fn update_document(update: LinkUpdate, now: i64) -> Result<Document, StoreError> {
    Ok(match update {
        LinkUpdate::RecordScan(scan) => {
            let scan = to_bson(&scan).map_err(|e| StoreError::Backend(e.to_string()))?;
            doc! {
                "$inc": { "scans": 1 },
                "$push": {
                    "scanHistory": {
                        "$each": [scan],
                        "$sort": { "timestamp": 1 },
                    }
                },
                "$set": { "updatedAt": now },
            }
        }
        LinkUpdate::Deactivate => doc! {
            "$set": { "isActive": false, "updatedAt": now },
        },
    })
}

fn active_filter(is_active: Option<bool>) -> Document {
    match is_active {
        Some(active) => doc! { "isActive": active },
        None => doc! {},
    }
}

#[async_trait]
impl LinkStore for MongoLinkStore {
    async fn find_one(
        &self,
        short_id: &str,
        active_only: bool,
    ) -> Result<Option<TrackedLink>, StoreError> {
        let mut filter = doc! { "shortId": short_id };
        if active_only {
            filter.insert("isActive", true);
        }
        self.links.find_one(filter).await.map_err(backend)
    }

    async fn find_many(&self, query: &ListQuery) -> Result<LinkPage, StoreError> {
        let filter = active_filter(query.is_active);
        let direction = match query.order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        };

        let mut sort = Document::new();
        sort.insert(query.sort_by.field_name(), direction);
        sort.insert("_id", direction);

        let items = self
            .links
            .find(filter.clone())
            .sort(sort)
            .skip(query.skip())
            .limit(query.limit as i64)
            .projection(doc! { "scanHistory": 0 })
            .await
            .map_err(backend)?
            .try_collect::<Vec<TrackedLink>>()
            .await
            .map_err(backend)?;

        let total = self.links.count_documents(filter).await.map_err(backend)?;

        Ok(LinkPage { items, total })
    }

    async fn insert(&self, link: &TrackedLink) -> Result<(), StoreError> {
        match self.links.insert_one(link).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::DuplicateId(link.short_id.clone())),
            Err(e) => Err(backend(e)),
        }
    }

    async fn update(&self, short_id: &str, update: LinkUpdate) -> Result<bool, StoreError> {
        let update_doc = update_document(update, chrono::Utc::now().timestamp_millis())?;

        let result = self
            .links
            .update_one(doc! { "shortId": short_id }, update_doc)
            .await
            .map_err(backend)?;

        Ok(result.matched_count > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.db
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(backend)
    }
}
