//! Booking Repository

use async_trait::async_trait;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::{Collection, Database, bson::{doc, Document}};

use crate::booking::entity::{status, AssignedDecorator, Booking, BookingSlot};
use crate::shared::error::{is_duplicate_key_error, PlatformError, Result};

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking. A second booking with the same `transactionId`
    /// fails with `PlatformError::Conflict`.
    async fn insert(&self, booking: &Booking) -> Result<ObjectId>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Booking>>;

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Booking>>;

    /// Exact match on customer, listing, date and time window
    async fn find_by_slot(&self, slot: &BookingSlot) -> Result<Option<Booking>>;

    /// Newest first
    async fn find_by_status(&self, status: &str) -> Result<Vec<Booking>>;

    /// Newest first
    async fn find_by_customer(&self, email: &str) -> Result<Vec<Booking>>;

    /// Bookings whose assigned decorator has `email`, newest first
    async fn find_by_decorator(&self, email: &str, status: Option<&str>) -> Result<Vec<Booking>>;

    async fn assign_decorator(&self, id: &ObjectId, decorator: &AssignedDecorator) -> Result<bool>;

    async fn update_status(&self, id: &ObjectId, status: &str) -> Result<bool>;

    async fn cancel_by_transaction_id(&self, transaction_id: &str) -> Result<bool>;
}

pub struct MongoBookingRepository {
    collection: Collection<Booking>,
}

impl MongoBookingRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("bookings"),
        }
    }

    async fn find_sorted(&self, filter: Document) -> Result<Vec<Booking>> {
        let cursor = self.collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

fn slot_filter(slot: &BookingSlot) -> Document {
    doc! {
        "customer.email": &slot.customer_email,
        "decorationId": &slot.decoration_id,
        "bookingDate": &slot.booking_date,
        "startTime": &slot.start_time,
        "endTime": &slot.end_time,
    }
}

#[async_trait]
impl BookingRepository for MongoBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId> {
        let result = match self.collection.insert_one(booking).await {
            Ok(result) => result,
            Err(err) if is_duplicate_key_error(&err) => {
                return Err(PlatformError::conflict(format!(
                    "A booking already exists for transaction {}",
                    booking.transaction_id.as_deref().unwrap_or("-")
                )));
            }
            Err(err) => return Err(err.into()),
        };
        result.inserted_id
            .as_object_id()
            .ok_or_else(|| PlatformError::internal("insert did not return an ObjectId"))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Booking>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Booking>> {
        Ok(self.collection.find_one(doc! { "transactionId": transaction_id }).await?)
    }

    async fn find_by_slot(&self, slot: &BookingSlot) -> Result<Option<Booking>> {
        Ok(self.collection.find_one(slot_filter(slot)).await?)
    }

    async fn find_by_status(&self, status: &str) -> Result<Vec<Booking>> {
        self.find_sorted(doc! { "status": status }).await
    }

    async fn find_by_customer(&self, email: &str) -> Result<Vec<Booking>> {
        self.find_sorted(doc! { "customer.email": email }).await
    }

    async fn find_by_decorator(&self, email: &str, status: Option<&str>) -> Result<Vec<Booking>> {
        let mut filter = doc! { "assignedDecorator.email": email };
        if let Some(status) = status {
            filter.insert("status", status);
        }
        self.find_sorted(filter).await
    }

    async fn assign_decorator(&self, id: &ObjectId, decorator: &AssignedDecorator) -> Result<bool> {
        let snapshot = bson::to_bson(decorator)?;
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "assignedDecorator": snapshot,
                        "status": status::DECORATOR_ASSIGNED,
                        "assignedAt": bson::DateTime::now(),
                    }
                },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn update_status(&self, id: &ObjectId, status: &str) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "status": status, "updatedAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn cancel_by_transaction_id(&self, transaction_id: &str) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "transactionId": transaction_id },
                doc! { "$set": { "status": status::CANCELLED, "cancelledAt": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_filter_uses_stored_keys() {
        let filter = slot_filter(&BookingSlot {
            customer_email: "c@example.com".into(),
            decoration_id: "d1".into(),
            booking_date: "2025-12-20".into(),
            start_time: "10:00".into(),
            end_time: "12:00".into(),
        });
        assert_eq!(filter.get_str("customer.email").unwrap(), "c@example.com");
        assert_eq!(filter.get_str("decorationId").unwrap(), "d1");
        assert_eq!(filter.get_str("bookingDate").unwrap(), "2025-12-20");
        assert_eq!(filter.len(), 5);
    }
}
