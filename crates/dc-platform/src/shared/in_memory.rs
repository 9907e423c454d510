//! In-memory repositories
//!
//! Process-local implementations of the repository traits, used for the
//! `memory` store backend and by tests. They mirror the MongoDB behaviour the
//! use cases rely on: ObjectId assignment, the unique `users.email` and
//! sparse unique `bookings.transactionId` indexes, and newest-first ordering.

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::Utc;
use parking_lot::RwLock;
use std::cmp::Reverse;

use crate::booking::entity::{status, AssignedDecorator, Booking, BookingSlot};
use crate::booking::repository::BookingRepository;
use crate::decoration::entity::{Decoration, DecorationFilter};
use crate::decoration::repository::DecorationRepository;
use crate::promotion::entity::{PromotionRequest, RequestStatus};
use crate::promotion::repository::PromotionRequestRepository;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{ContactDetails, User, UserRole, WorkStatus};
use crate::user::repository::{LoginOutcome, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed user, bypassing the login upsert
    pub fn insert(&self, mut user: User) -> Result<ObjectId> {
        let mut users = self.users.write();
        if users.iter().any(|u| u.email == user.email) {
            return Err(PlatformError::conflict(format!("User {} already exists", user.email)));
        }
        let id = *user.id.get_or_insert_with(ObjectId::new);
        users.push(user);
        Ok(id)
    }

    fn update_where<F>(&self, predicate: impl Fn(&User) -> bool, apply: F) -> bool
    where
        F: FnOnce(&mut User),
    {
        let mut users = self.users.write();
        match users.iter_mut().find(|u| predicate(u)) {
            Some(user) => {
                apply(user);
                user.updated_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.users.read().clone())
    }

    async fn find_decorators(&self, division: Option<&str>, district: Option<&str>) -> Result<Vec<User>> {
        Ok(self.users
            .read()
            .iter()
            .filter(|u| u.role.as_deref() == Some(UserRole::Decorator.as_str()))
            .filter(|u| division.map_or(true, |d| u.division.as_deref() == Some(d)))
            .filter(|u| district.map_or(true, |d| u.district.as_deref() == Some(d)))
            .cloned()
            .collect())
    }

    async fn record_login(&self, user: &User, logged_in_at: &str) -> Result<LoginOutcome> {
        let mut users = self.users.write();
        if let Some(existing) = users.iter_mut().find(|u| u.email == user.email) {
            existing.last_logged_in = Some(logged_in_at.to_string());
            return Ok(LoginOutcome::Updated);
        }

        let mut created = user.clone();
        let id = *created.id.get_or_insert_with(ObjectId::new);
        created.last_logged_in = Some(logged_in_at.to_string());
        users.push(created);
        Ok(LoginOutcome::Created(id))
    }

    async fn update_role(&self, email: &str, role: UserRole) -> Result<bool> {
        Ok(self.update_where(|u| u.email == email, |user| {
            match role {
                UserRole::Decorator => {
                    user.role = Some(role.as_str().to_string());
                    user.work_status = Some(WorkStatus::Available);
                }
                UserRole::Admin => {
                    user.role = Some(role.as_str().to_string());
                    user.work_status = None;
                }
                UserRole::Customer => {
                    user.role = None;
                    user.work_status = None;
                }
            }
        }))
    }

    async fn set_work_status(&self, id: &ObjectId, status: WorkStatus) -> Result<bool> {
        Ok(self.update_where(|u| u.id.as_ref() == Some(id), |user| {
            user.work_status = Some(status);
        }))
    }

    async fn promote_to_decorator(&self, email: &str, contact: &ContactDetails) -> Result<bool> {
        Ok(self.update_where(|u| u.email == email, |user| {
            user.role = Some(UserRole::Decorator.as_str().to_string());
            user.work_status = Some(WorkStatus::Available);
            user.phone = Some(contact.phone.clone());
            user.division = Some(contact.division.clone());
            user.district = Some(contact.district.clone());
        }))
    }
}

#[derive(Default)]
pub struct InMemoryDecorationRepository {
    decorations: RwLock<Vec<Decoration>>,
}

impl InMemoryDecorationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DecorationRepository for InMemoryDecorationRepository {
    async fn insert(&self, decoration: &Decoration) -> Result<ObjectId> {
        let mut stored = decoration.clone();
        let id = *stored.id.get_or_insert_with(ObjectId::new);
        self.decorations.write().push(stored);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Decoration>> {
        Ok(self.decorations.read().iter().find(|d| d.id.as_ref() == Some(id)).cloned())
    }

    async fn find(&self, filter: &DecorationFilter) -> Result<Vec<Decoration>> {
        Ok(self.decorations
            .read()
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }

    async fn update(&self, id: &ObjectId, decoration: &Decoration) -> Result<bool> {
        let mut decorations = self.decorations.write();
        match decorations.iter_mut().find(|d| d.id.as_ref() == Some(id)) {
            Some(existing) => {
                existing.name = decoration.name.clone();
                existing.category = decoration.category.clone();
                existing.description = decoration.description.clone();
                existing.price = decoration.price;
                if decoration.image.is_some() {
                    existing.image = decoration.image.clone();
                }
                existing.updated_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool> {
        let mut decorations = self.decorations.write();
        let before = decorations.len();
        decorations.retain(|d| d.id.as_ref() != Some(id));
        Ok(decorations.len() < before)
    }
}

#[derive(Default)]
pub struct InMemoryBookingRepository {
    bookings: RwLock<Vec<Booking>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matching bookings, newest first; insertion order breaks ties
    fn newest_first(&self, predicate: impl Fn(&Booking) -> bool) -> Vec<Booking> {
        let mut matches: Vec<(usize, Booking)> = self.bookings
            .read()
            .iter()
            .enumerate()
            .filter(|(_, b)| predicate(b))
            .map(|(i, b)| (i, b.clone()))
            .collect();
        matches.sort_by_key(|(i, b)| Reverse((b.created_at, *i)));
        matches.into_iter().map(|(_, b)| b).collect()
    }

    fn update_where<F>(&self, predicate: impl Fn(&Booking) -> bool, apply: F) -> bool
    where
        F: FnOnce(&mut Booking),
    {
        let mut bookings = self.bookings.write();
        match bookings.iter_mut().find(|b| predicate(b)) {
            Some(booking) => {
                apply(booking);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn insert(&self, booking: &Booking) -> Result<ObjectId> {
        let mut bookings = self.bookings.write();
        if let Some(transaction_id) = &booking.transaction_id {
            if bookings.iter().any(|b| b.transaction_id.as_ref() == Some(transaction_id)) {
                return Err(PlatformError::conflict(format!(
                    "A booking already exists for transaction {}",
                    transaction_id
                )));
            }
        }
        let mut stored = booking.clone();
        let id = *stored.id.get_or_insert_with(ObjectId::new);
        bookings.push(stored);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Booking>> {
        Ok(self.bookings.read().iter().find(|b| b.id.as_ref() == Some(id)).cloned())
    }

    async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<Booking>> {
        Ok(self.bookings
            .read()
            .iter()
            .find(|b| b.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    async fn find_by_slot(&self, slot: &BookingSlot) -> Result<Option<Booking>> {
        Ok(self.bookings.read().iter().find(|b| &b.slot() == slot).cloned())
    }

    async fn find_by_status(&self, wanted: &str) -> Result<Vec<Booking>> {
        Ok(self.newest_first(|b| b.status == wanted))
    }

    async fn find_by_customer(&self, email: &str) -> Result<Vec<Booking>> {
        Ok(self.newest_first(|b| b.customer.email == email))
    }

    async fn find_by_decorator(&self, email: &str, wanted: Option<&str>) -> Result<Vec<Booking>> {
        Ok(self.newest_first(|b| {
            b.assigned_decorator.as_ref().map_or(false, |d| d.email == email)
                && wanted.map_or(true, |s| b.status == s)
        }))
    }

    async fn assign_decorator(&self, id: &ObjectId, decorator: &AssignedDecorator) -> Result<bool> {
        Ok(self.update_where(|b| b.id.as_ref() == Some(id), |booking| {
            booking.assigned_decorator = Some(decorator.clone());
            booking.status = status::DECORATOR_ASSIGNED.to_string();
            booking.assigned_at = Some(Utc::now());
        }))
    }

    async fn update_status(&self, id: &ObjectId, new_status: &str) -> Result<bool> {
        Ok(self.update_where(|b| b.id.as_ref() == Some(id), |booking| {
            booking.status = new_status.to_string();
            booking.updated_at = Some(Utc::now());
        }))
    }

    async fn cancel_by_transaction_id(&self, transaction_id: &str) -> Result<bool> {
        Ok(self.update_where(
            |b| b.transaction_id.as_deref() == Some(transaction_id),
            |booking| {
                booking.status = status::CANCELLED.to_string();
                booking.cancelled_at = Some(Utc::now());
            },
        ))
    }
}

#[derive(Default)]
pub struct InMemoryPromotionRequestRepository {
    requests: RwLock<Vec<PromotionRequest>>,
}

impl InMemoryPromotionRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PromotionRequestRepository for InMemoryPromotionRequestRepository {
    async fn insert(&self, request: &PromotionRequest) -> Result<ObjectId> {
        let mut stored = request.clone();
        let id = *stored.id.get_or_insert_with(ObjectId::new);
        self.requests.write().push(stored);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PromotionRequest>> {
        Ok(self.requests.read().iter().find(|r| r.id.as_ref() == Some(id)).cloned())
    }

    async fn find_open_by_email(&self, email: &str) -> Result<Option<PromotionRequest>> {
        Ok(self.requests
            .read()
            .iter()
            .find(|r| r.email == email && r.status.is_open())
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<PromotionRequest>> {
        let mut all: Vec<(usize, PromotionRequest)> =
            self.requests.read().iter().cloned().enumerate().collect();
        all.sort_by_key(|(i, r)| Reverse((r.requested_at, *i)));
        Ok(all.into_iter().map(|(_, r)| r).collect())
    }

    async fn set_status(&self, id: &ObjectId, new_status: RequestStatus) -> Result<bool> {
        let mut requests = self.requests.write();
        match requests.iter_mut().find(|r| r.id.as_ref() == Some(id)) {
            Some(request) => {
                request.status = new_status;
                match new_status {
                    RequestStatus::Approved => request.approved_at = Some(Utc::now()),
                    RequestStatus::Rejected => request.rejected_at = Some(Utc::now()),
                    RequestStatus::Pending => {}
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn slot(email: &str, date: &str) -> BookingSlot {
        BookingSlot {
            customer_email: email.into(),
            decoration_id: "d1".into(),
            booking_date: date.into(),
            start_time: "10:00".into(),
            end_time: "12:00".into(),
        }
    }

    #[tokio::test]
    async fn test_transaction_id_is_unique() {
        let repo = InMemoryBookingRepository::new();
        let mut booking = Booking::new(slot("c@example.com", "2025-12-20"), None);
        booking.transaction_id = Some("pi_1".into());

        repo.insert(&booking).await.unwrap();
        let err = repo.insert(&booking).await.unwrap_err();
        assert!(err.is_duplicate_key());

        // Bookings without a transaction id are not constrained
        let plain = Booking::new(slot("c@example.com", "2025-12-21"), None);
        repo.insert(&plain).await.unwrap();
        repo.insert(&plain).await.unwrap();
    }

    #[tokio::test]
    async fn test_customer_bookings_newest_first() {
        let repo = InMemoryBookingRepository::new();
        let older = Booking::new(slot("c@example.com", "2025-12-01"), None);
        let newer = Booking::new(slot("c@example.com", "2025-12-02"), None);
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let bookings = repo.find_by_customer("c@example.com").await.unwrap();
        assert_eq!(bookings.len(), 2);
        assert_eq!(bookings[0].booking_date, "2025-12-02");
    }

    #[tokio::test]
    async fn test_login_upsert() {
        let repo = InMemoryUserRepository::new();
        let user = User::new("c@example.com").with_name("C");

        let first = repo.record_login(&user, "2025-01-01T00:00:00Z").await.unwrap();
        assert!(matches!(first, LoginOutcome::Created(_)));

        let second = repo.record_login(&user, "2025-01-02T00:00:00Z").await.unwrap();
        assert_eq!(second, LoginOutcome::Updated);

        let stored = repo.find_by_email("c@example.com").await.unwrap().unwrap();
        assert_eq!(stored.last_logged_in.as_deref(), Some("2025-01-02T00:00:00Z"));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_decoration_crud() {
        let repo = InMemoryDecorationRepository::new();
        let id = repo
            .insert(&Decoration::new("Stage", "wedding", Decimal::new(500, 0)))
            .await
            .unwrap();

        let mut changed = Decoration::new("Grand Stage", "wedding", Decimal::new(650, 0));
        changed.image = Some("https://img.example/stage.jpg".into());
        assert!(repo.update(&id, &changed).await.unwrap());

        let stored = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Grand Stage");
        assert!(stored.updated_at.is_some());

        assert!(repo.delete(&id).await.unwrap());
        assert!(!repo.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_request_lookup_ignores_rejected() {
        let repo = InMemoryPromotionRequestRepository::new();
        let contact = ContactDetails {
            phone: "1".into(),
            division: "Dhaka".into(),
            district: "Dhaka".into(),
        };
        let id = repo
            .insert(&PromotionRequest::new("R", "r@example.com", contact))
            .await
            .unwrap();
        assert!(repo.find_open_by_email("r@example.com").await.unwrap().is_some());

        repo.set_status(&id, RequestStatus::Rejected).await.unwrap();
        assert!(repo.find_open_by_email("r@example.com").await.unwrap().is_none());
        assert!(repo.find_by_id(&id).await.unwrap().unwrap().rejected_at.is_some());
    }
}
