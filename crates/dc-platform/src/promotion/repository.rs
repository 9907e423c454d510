//! Promotion Request Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};

use crate::promotion::entity::{PromotionRequest, RequestStatus};
use crate::shared::error::{PlatformError, Result};

#[async_trait]
pub trait PromotionRequestRepository: Send + Sync {
    async fn insert(&self, request: &PromotionRequest) -> Result<ObjectId>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PromotionRequest>>;

    /// A pending or approved request for the email, if any
    async fn find_open_by_email(&self, email: &str) -> Result<Option<PromotionRequest>>;

    /// Newest first
    async fn find_all(&self) -> Result<Vec<PromotionRequest>>;

    /// Set the status and its timestamp (`approvedAt` / `rejectedAt`)
    async fn set_status(&self, id: &ObjectId, status: RequestStatus) -> Result<bool>;
}

pub struct MongoPromotionRequestRepository {
    collection: Collection<PromotionRequest>,
}

impl MongoPromotionRequestRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("decoratorRequests"),
        }
    }
}

#[async_trait]
impl PromotionRequestRepository for MongoPromotionRequestRepository {
    async fn insert(&self, request: &PromotionRequest) -> Result<ObjectId> {
        let result = self.collection.insert_one(request).await?;
        result.inserted_id
            .as_object_id()
            .ok_or_else(|| PlatformError::internal("insert did not return an ObjectId"))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PromotionRequest>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_open_by_email(&self, email: &str) -> Result<Option<PromotionRequest>> {
        Ok(self.collection
            .find_one(doc! {
                "email": email,
                "status": { "$in": [RequestStatus::Pending.as_str(), RequestStatus::Approved.as_str()] }
            })
            .await?)
    }

    async fn find_all(&self) -> Result<Vec<PromotionRequest>> {
        let cursor = self.collection
            .find(doc! {})
            .sort(doc! { "requestedAt": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn set_status(&self, id: &ObjectId, status: RequestStatus) -> Result<bool> {
        let now = bson::DateTime::now();
        let mut fields = doc! { "status": status.as_str() };
        match status {
            RequestStatus::Approved => { fields.insert("approvedAt", now); }
            RequestStatus::Rejected => { fields.insert("rejectedAt", now); }
            RequestStatus::Pending => {}
        }

        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }
}
