//! Bookings API
//!
//! Customer bookings, the admin queue, decorator task lists and the
//! booking workflow transitions.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::booking::entity::{status, AssignedDecorator, Booking, CustomerInfo};
use crate::booking::operations::{
    AssignDecoratorCommand, AssignDecoratorUseCase, BookingCancelled, BookingStatusChanged,
    CancelBookingCommand, CancelBookingUseCase, CreateBookingCommand, CreateBookingUseCase,
    DecoratorAssigned, UpdateBookingStatusCommand, UpdateBookingStatusUseCase,
};
use crate::booking::repository::BookingRepository;
use crate::shared::api_common::{non_blank, CreatedResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::{AdminOnly, Authenticated};
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub decoration_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoration_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub customer: CustomerInfo,
    pub status: String,
    #[serde(rename = "payment_status")]
    pub payment_status: String,
    #[serde(with = "rust_decimal::serde::float_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub assigned_decorator: Option<AssignedDecorator>,
    pub booking_date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booked_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id_hex(),
            decoration_id: b.decoration_id,
            decoration_name: b.decoration_name,
            category: b.category,
            transaction_id: b.transaction_id,
            customer: b.customer,
            status: b.status,
            payment_status: b.payment_status,
            price: b.price,
            assigned_decorator: b.assigned_decorator,
            booking_date: b.booking_date,
            start_time: b.start_time,
            end_time: b.end_time,
            division: b.division,
            district: b.district,
            phone: b.phone,
            created_at: b.created_at.to_rfc3339(),
            booked_at: b.booked_at.map(|t| t.to_rfc3339()),
            assigned_at: b.assigned_at.map(|t| t.to_rfc3339()),
            cancelled_at: b.cancelled_at.map(|t| t.to_rfc3339()),
            updated_at: b.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

fn to_responses(bookings: Vec<Booking>) -> Json<Vec<BookingResponse>> {
    Json(bookings.into_iter().map(BookingResponse::from).collect())
}

/// Query parameters for a decorator's task list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignedTaskQuery {
    /// Decorator email; defaults to the caller
    pub email: Option<String>,
    /// Only bookings in this status
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone)]
pub struct BookingsState {
    pub bookings: Arc<dyn BookingRepository>,
    pub create_use_case: Arc<CreateBookingUseCase>,
    pub assign_use_case: Arc<AssignDecoratorUseCase>,
    pub status_use_case: Arc<UpdateBookingStatusUseCase>,
    pub cancel_use_case: Arc<CancelBookingUseCase>,
}

impl BookingsState {
    pub fn new(bookings: Arc<dyn BookingRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self {
            create_use_case: Arc::new(CreateBookingUseCase::new(bookings.clone())),
            assign_use_case: Arc::new(AssignDecoratorUseCase::new(bookings.clone(), users)),
            status_use_case: Arc::new(UpdateBookingStatusUseCase::new(bookings.clone())),
            cancel_use_case: Arc::new(CancelBookingUseCase::new(bookings.clone())),
            bookings,
        }
    }
}

/// Book a decoration directly
#[utoipa::path(
    post,
    path = "/userBooks",
    tag = "bookings",
    request_body = CreateBookingCommand,
    responses(
        (status = 200, description = "Booking created", body = CreatedResponse),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "Already booked this decoration")
    )
)]
pub async fn create_booking(
    State(state): State<BookingsState>,
    Json(command): Json<CreateBookingCommand>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    match state.create_use_case.execute(command, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(created) => {
            Ok(Json(CreatedResponse::with_message(created.booking_id, "Booking successful")))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Pending bookings awaiting a decorator
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    responses(
        (status = 200, description = "Pending bookings, newest first", body = Vec<BookingResponse>),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_pending_bookings(
    State(state): State<BookingsState>,
    _auth: AdminOnly,
) -> Result<Json<Vec<BookingResponse>>, PlatformError> {
    let bookings = state.bookings.find_by_status(status::PENDING).await?;
    Ok(to_responses(bookings))
}

/// Bookings assigned to a decorator
#[utoipa::path(
    get,
    path = "/assigned-task",
    tag = "bookings",
    params(AssignedTaskQuery),
    responses(
        (status = 200, description = "Assigned bookings", body = Vec<BookingResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_assigned_tasks(
    State(state): State<BookingsState>,
    auth: Authenticated,
    Query(query): Query<AssignedTaskQuery>,
) -> Result<Json<Vec<BookingResponse>>, PlatformError> {
    let email = non_blank(query.email.as_deref()).unwrap_or(auth.email.as_str());
    let wanted = non_blank(query.status.as_deref());
    let bookings = state.bookings.find_by_decorator(email, wanted).await?;
    Ok(to_responses(bookings))
}

/// Set a booking's status
#[utoipa::path(
    patch,
    path = "/bookings/{id}/status",
    tag = "bookings",
    params(
        ("id" = String, Path, description = "Booking ID")
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = BookingStatusChanged),
        (status = 400, description = "Status missing"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_booking_status(
    State(state): State<BookingsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<BookingStatusChanged>, PlatformError> {
    let command = UpdateBookingStatusCommand {
        booking_id: id,
        status: req.status,
    };
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.status_use_case.execute(command, ctx).await {
        UseCaseResult::Success(changed) => Ok(Json(changed)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Assign a decorator to a booking
#[utoipa::path(
    patch,
    path = "/bookings/assign-decorator",
    tag = "bookings",
    request_body = AssignDecoratorCommand,
    responses(
        (status = 200, description = "Decorator assigned", body = DecoratorAssigned),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Booking or decorator not found"),
        (status = 500, description = "Booking assigned but decorator status not updated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn assign_decorator(
    State(state): State<BookingsState>,
    auth: AdminOnly,
    Json(command): Json<AssignDecoratorCommand>,
) -> Result<Json<DecoratorAssigned>, PlatformError> {
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.assign_use_case.execute(command, ctx).await {
        UseCaseResult::Success(assigned) => Ok(Json(assigned)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Cancel a booking by its payment transaction id
#[utoipa::path(
    patch,
    path = "/bookings/cancel/{transactionId}",
    tag = "bookings",
    params(
        ("transactionId" = String, Path, description = "Payment transaction ID")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = BookingCancelled),
        (status = 404, description = "No booking for that transaction")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(state): State<BookingsState>,
    auth: Authenticated,
    Path(transaction_id): Path<String>,
) -> Result<Json<BookingCancelled>, PlatformError> {
    let ctx = ExecutionContext::create(auth.email.clone());

    match state.cancel_use_case.execute(CancelBookingCommand { transaction_id }, ctx).await {
        UseCaseResult::Success(cancelled) => Ok(Json(cancelled)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// The caller's own bookings
#[utoipa::path(
    get,
    path = "/my-bookins",
    tag = "bookings",
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = Vec<BookingResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_bookings(
    State(state): State<BookingsState>,
    auth: Authenticated,
) -> Result<Json<Vec<BookingResponse>>, PlatformError> {
    let bookings = state.bookings.find_by_customer(&auth.email).await?;
    Ok(to_responses(bookings))
}

/// Bookings assigned to the caller
#[utoipa::path(
    get,
    path = "/manage-booking",
    tag = "bookings",
    responses(
        (status = 200, description = "Bookings assigned to the caller", body = Vec<BookingResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_managed_bookings(
    State(state): State<BookingsState>,
    auth: Authenticated,
) -> Result<Json<Vec<BookingResponse>>, PlatformError> {
    let bookings = state.bookings.find_by_decorator(&auth.email, None).await?;
    Ok(to_responses(bookings))
}

/// Create bookings router
pub fn bookings_router(state: BookingsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_booking))
        .routes(routes!(list_pending_bookings))
        .routes(routes!(list_assigned_tasks))
        .routes(routes!(update_booking_status))
        .routes(routes!(assign_decorator))
        .routes(routes!(cancel_booking))
        .routes(routes!(list_my_bookings))
        .routes(routes!(list_managed_bookings))
        .with_state(state)
}
