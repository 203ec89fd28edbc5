//! Payment mutation handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::{
        EditPaymentRequest, PaymentCreatedResponse, RecordExtraPaymentRequest,
        RecordPaymentRequest, StateChangedResponse,
    },
    models::Payment,
    AppState,
};

fn recorded_by(field: Option<String>) -> String {
    field.unwrap_or_else(|| "unknown".to_string())
}

/// Record a regular payment: runs the split and appends to the history.
pub async fn record_payment(
    State(state): State<AppState>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentCreatedResponse>), AppError> {
    tracing::info!(amount = %payload.amount, "Recording payment");

    let (payment, view) = state
        .ledger
        .record_regular(
            payload.amount,
            recorded_by(payload.recorded_by),
            payload.comment,
            payload.period,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentCreatedResponse {
            payment: Payment::Regular(payment),
            state: view,
        }),
    ))
}

/// Record an out-of-band extra payment against one partner.
pub async fn record_extra_payment(
    State(state): State<AppState>,
    Json(payload): Json<RecordExtraPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentCreatedResponse>), AppError> {
    tracing::info!(partner = %payload.partner, amount = %payload.amount, "Recording extra payment");

    let (payment, view) = state
        .ledger
        .record_extra(
            &payload.partner,
            payload.amount,
            recorded_by(payload.recorded_by),
            payload.comment,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PaymentCreatedResponse {
            payment: Payment::Extra(payment),
            state: view,
        }),
    ))
}

/// Edit a payment's mutable fields (amount, comment, period).
pub async fn edit_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<EditPaymentRequest>,
) -> Result<Json<StateChangedResponse>, AppError> {
    tracing::info!(payment_id = %payment_id, "Editing payment");

    let view = state
        .ledger
        .edit_payment(payment_id, payload.into())
        .await?;
    Ok(Json(StateChangedResponse { state: view }))
}

/// Delete a payment and rebuild the totals it contributed to.
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<StateChangedResponse>, AppError> {
    tracing::info!(payment_id = %payment_id, "Deleting payment");

    let view = state.ledger.delete_payment(payment_id).await?;
    Ok(Json(StateChangedResponse { state: view }))
}
