//! Decoration Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::{doc, Document}};
use rust_decimal::prelude::ToPrimitive;

use crate::decoration::entity::{Decoration, DecorationFilter};
use crate::shared::error::{PlatformError, Result};

#[async_trait]
pub trait DecorationRepository: Send + Sync {
    async fn insert(&self, decoration: &Decoration) -> Result<ObjectId>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Decoration>>;

    async fn find(&self, filter: &DecorationFilter) -> Result<Vec<Decoration>>;

    /// Replace the editable fields; returns false when the id is unknown
    async fn update(&self, id: &ObjectId, decoration: &Decoration) -> Result<bool>;

    async fn delete(&self, id: &ObjectId) -> Result<bool>;
}

pub struct MongoDecorationRepository {
    collection: Collection<Decoration>,
}

impl MongoDecorationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("decorations"),
        }
    }
}

fn filter_document(filter: &DecorationFilter) -> Document {
    let mut query = doc! {};
    if let Some(category) = &filter.category {
        let pattern = format!("^{}$", regex::escape(category));
        query.insert("category", doc! { "$regex": pattern, "$options": "i" });
    }
    if let Some(search) = &filter.search {
        query.insert("name", doc! { "$regex": regex::escape(search), "$options": "i" });
    }
    query
}

#[async_trait]
impl DecorationRepository for MongoDecorationRepository {
    async fn insert(&self, decoration: &Decoration) -> Result<ObjectId> {
        let result = self.collection.insert_one(decoration).await?;
        result.inserted_id
            .as_object_id()
            .ok_or_else(|| PlatformError::internal("insert did not return an ObjectId"))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Decoration>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find(&self, filter: &DecorationFilter) -> Result<Vec<Decoration>> {
        let cursor = self.collection.find(filter_document(filter)).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, id: &ObjectId, decoration: &Decoration) -> Result<bool> {
        let mut fields = doc! {
            "name": &decoration.name,
            "category": &decoration.category,
            "description": &decoration.description,
            "price": decoration.price.to_f64().unwrap_or_default(),
            "updatedAt": bson::DateTime::now(),
        };
        if let Some(image) = &decoration.image {
            fields.insert("image", image);
        }

        let result = self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_document_escapes_user_input() {
        let query = filter_document(&DecorationFilter {
            category: Some("wedding".into()),
            search: Some("arch (large)".into()),
        });

        let category = query.get_document("category").unwrap();
        assert_eq!(category.get_str("$regex").unwrap(), "^wedding$");

        let name = query.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"arch \(large\)");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(filter_document(&DecorationFilter::default()).is_empty());
    }
}
