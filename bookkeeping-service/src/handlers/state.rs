//! Read-side handlers: state, history, monthly breakdown.

use axum::{
    extract::{Query, State},
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::{BreakdownParams, HistoryParams},
    models::{HistoryView, MonthlyBreakdown, StateView},
    AppState,
};

/// Current derived state: totals, remaining debt, per-partner standings.
pub async fn get_state(State(state): State<AppState>) -> Json<StateView> {
    Json(state.ledger.state().await)
}

/// Payment history, most recent first.
pub async fn get_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<HistoryView> {
    Json(state.ledger.history(params.limit).await)
}

/// Payments and salary flows attributed to one calendar month.
pub async fn get_breakdown(
    State(state): State<AppState>,
    Query(params): Query<BreakdownParams>,
) -> Result<Json<MonthlyBreakdown>, AppError> {
    tracing::info!(month = params.month, year = params.year, "Computing monthly breakdown");
    let breakdown = state
        .ledger
        .monthly_breakdown(params.month, params.year)
        .await?;
    Ok(Json(breakdown))
}
