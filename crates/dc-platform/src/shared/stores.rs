//! Repository Sets
//!
//! The four collections behind the API, backed either by MongoDB or by
//! process-local maps.

use mongodb::Database;
use std::sync::Arc;

use crate::booking::repository::{BookingRepository, MongoBookingRepository};
use crate::decoration::repository::{DecorationRepository, MongoDecorationRepository};
use crate::promotion::repository::{MongoPromotionRequestRepository, PromotionRequestRepository};
use crate::shared::in_memory::{
    InMemoryBookingRepository, InMemoryDecorationRepository, InMemoryPromotionRequestRepository,
    InMemoryUserRepository,
};
use crate::user::repository::{MongoUserRepository, UserRepository};

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub decorations: Arc<dyn DecorationRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub promotions: Arc<dyn PromotionRequestRepository>,
}

impl Repositories {
    pub fn mongo(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            decorations: Arc::new(MongoDecorationRepository::new(db)),
            bookings: Arc::new(MongoBookingRepository::new(db)),
            promotions: Arc::new(MongoPromotionRequestRepository::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            decorations: Arc::new(InMemoryDecorationRepository::new()),
            bookings: Arc::new(InMemoryBookingRepository::new()),
            promotions: Arc::new(InMemoryPromotionRequestRepository::new()),
        }
    }
}
