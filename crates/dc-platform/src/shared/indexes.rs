//! MongoDB Index Initialization
//!
//! Creates indexes for all collections on application startup.

use mongodb::{Database, IndexModel, bson::doc, options::IndexOptions};
use tracing::info;

/// Initialize all MongoDB indexes
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_decoration_indexes(db).await?;
    create_booking_indexes(db).await?;
    create_decorator_request_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

fn lookup(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().background(true).build())
        .build()
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("users");

    // One account per email; login upserts rely on it
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    // Decorator lookup by area
    collection.create_index(lookup(doc! { "role": 1, "division": 1, "district": 1 })).await?;

    info!("Created indexes on users");
    Ok(())
}

async fn create_decoration_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("decorations");

    collection.create_index(lookup(doc! { "category": 1 })).await?;

    info!("Created indexes on decorations");
    Ok(())
}

async fn create_booking_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("bookings");

    // At most one booking per payment intent. Sparse so bookings created
    // without checkout do not collide on a missing field.
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "transactionId": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .sparse(true)
                .background(true)
                .build())
            .build(),
    ).await?;

    collection.create_index(lookup(doc! { "customer.email": 1, "created_at": -1 })).await?;
    collection.create_index(lookup(doc! { "assignedDecorator.email": 1, "status": 1 })).await?;
    collection.create_index(lookup(doc! { "status": 1, "created_at": -1 })).await?;

    // Duplicate slot check
    collection.create_index(lookup(doc! {
        "customer.email": 1,
        "decorationId": 1,
        "bookingDate": 1,
        "startTime": 1,
    })).await?;

    info!("Created indexes on bookings");
    Ok(())
}

async fn create_decorator_request_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>("decoratorRequests");

    collection.create_index(lookup(doc! { "email": 1, "status": 1 })).await?;
    collection.create_index(lookup(doc! { "requestedAt": -1 })).await?;

    info!("Created indexes on decoratorRequests");
    Ok(())
}
