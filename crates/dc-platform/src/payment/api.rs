//! Payments API
//!
//! Checkout session creation and the confirmation call made after the
//! processor redirects back.

use axum::{extract::State, Json};
use std::sync::Arc;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::booking::repository::BookingRepository;
use crate::decoration::repository::DecorationRepository;
use crate::payment::gateway::PaymentGateway;
use crate::payment::operations::{
    CheckoutSettings, CheckoutStarted, ConfirmPaymentCommand, ConfirmPaymentUseCase,
    CreateCheckoutSessionCommand, CreateCheckoutSessionUseCase, PaymentConfirmed,
};
use crate::shared::error::PlatformError;
use crate::usecase::{ExecutionContext, UseCaseResult};

#[derive(Clone)]
pub struct PaymentsState {
    pub checkout_use_case: Arc<CreateCheckoutSessionUseCase>,
    pub confirm_use_case: Arc<ConfirmPaymentUseCase>,
}

impl PaymentsState {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
        decorations: Arc<dyn DecorationRepository>,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            checkout_use_case: Arc::new(CreateCheckoutSessionUseCase::new(gateway.clone(), settings)),
            confirm_use_case: Arc::new(ConfirmPaymentUseCase::new(gateway, decorations, bookings)),
        }
    }
}

/// Start a hosted checkout for a decoration
#[utoipa::path(
    post,
    path = "/create-checkout-session",
    tag = "payments",
    request_body = CreateCheckoutSessionCommand,
    responses(
        (status = 200, description = "Redirect URL for the hosted checkout", body = CheckoutStarted),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Payment gateway error")
    )
)]
pub async fn create_checkout_session(
    State(state): State<PaymentsState>,
    Json(command): Json<CreateCheckoutSessionCommand>,
) -> Result<Json<CheckoutStarted>, PlatformError> {
    match state.checkout_use_case.execute(command, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(started) => Ok(Json(started)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Confirm a checkout session and record the booking
#[utoipa::path(
    post,
    path = "/payment-success",
    tag = "payments",
    request_body = ConfirmPaymentCommand,
    responses(
        (status = 200, description = "Confirmed; `created` is false when nothing changed", body = PaymentConfirmed),
        (status = 404, description = "Session id missing or unknown"),
        (status = 500, description = "Payment gateway error")
    )
)]
pub async fn confirm_payment(
    State(state): State<PaymentsState>,
    Json(command): Json<ConfirmPaymentCommand>,
) -> Result<Json<PaymentConfirmed>, PlatformError> {
    match state.confirm_use_case.execute(command, ExecutionContext::anonymous()).await {
        UseCaseResult::Success(confirmed) => Ok(Json(confirmed)),
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Create payments router
pub fn payments_router(state: PaymentsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_checkout_session))
        .routes(routes!(confirm_payment))
        .with_state(state)
}
