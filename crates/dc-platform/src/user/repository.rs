//! User Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::{doc, Document}};

use crate::shared::error::Result;
use crate::user::entity::{ContactDetails, User, UserRole, WorkStatus};

/// What a login upsert did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Created(ObjectId),
    Updated,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>>;

    async fn find_all(&self) -> Result<Vec<User>>;

    /// Users with the decorator role, optionally restricted to one area
    async fn find_decorators(&self, division: Option<&str>, district: Option<&str>) -> Result<Vec<User>>;

    /// Insert `user` when no document has its email, otherwise only refresh
    /// `last_loggedIn`
    async fn record_login(&self, user: &User, logged_in_at: &str) -> Result<LoginOutcome>;

    /// Returns false when no user has the email
    async fn update_role(&self, email: &str, role: UserRole) -> Result<bool>;

    async fn set_work_status(&self, id: &ObjectId, status: WorkStatus) -> Result<bool>;

    /// Grant the decorator role and copy the request's contact details
    async fn promote_to_decorator(&self, email: &str, contact: &ContactDetails) -> Result<bool>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }
}

fn role_update(role: UserRole) -> Document {
    let now = bson::DateTime::now();
    match role {
        UserRole::Decorator => doc! {
            "$set": { "role": "decorator", "work_Status": "available", "updatedAt": now }
        },
        UserRole::Admin => doc! {
            "$set": { "role": "admin", "updatedAt": now },
            "$unset": { "work_Status": "" }
        },
        UserRole::Customer => doc! {
            "$set": { "updatedAt": now },
            "$unset": { "role": "", "work_Status": "" }
        },
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_decorators(&self, division: Option<&str>, district: Option<&str>) -> Result<Vec<User>> {
        let mut filter = doc! { "role": "decorator" };
        if let Some(division) = division {
            filter.insert("division", division);
        }
        if let Some(district) = district {
            filter.insert("district", district);
        }
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn record_login(&self, user: &User, logged_in_at: &str) -> Result<LoginOutcome> {
        let mut on_insert = bson::to_document(user)?;
        on_insert.remove("email");
        on_insert.remove("last_loggedIn");

        let mut update = doc! { "$set": { "last_loggedIn": logged_in_at } };
        if !on_insert.is_empty() {
            update.insert("$setOnInsert", on_insert);
        }

        let result = self.collection
            .update_one(doc! { "email": &user.email }, update)
            .upsert(true)
            .await?;

        Ok(match result.upserted_id.as_ref().and_then(|id| id.as_object_id()) {
            Some(id) => LoginOutcome::Created(id),
            None => LoginOutcome::Updated,
        })
    }

    async fn update_role(&self, email: &str, role: UserRole) -> Result<bool> {
        let result = self.collection
            .update_one(doc! { "email": email }, role_update(role))
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn set_work_status(&self, id: &ObjectId, status: WorkStatus) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "work_Status": status.as_str(), "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn promote_to_decorator(&self, email: &str, contact: &ContactDetails) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "email": email },
                doc! {
                    "$set": {
                        "role": UserRole::Decorator.as_str(),
                        "work_Status": WorkStatus::Available.as_str(),
                        "phone": &contact.phone,
                        "division": &contact.division,
                        "district": &contact.district,
                        "updatedAt": bson::DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
