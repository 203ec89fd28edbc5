//! Administrative handlers: partner configuration and ledger reset.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::{
    dtos::{ConfigUpdatedResponse, StateChangedResponse},
    models::PartnerConfig,
    AppState,
};

/// Replace the partner configuration and replay the history under it.
pub async fn update_config(
    State(state): State<AppState>,
    Json(payload): Json<PartnerConfig>,
) -> Result<Json<ConfigUpdatedResponse>, AppError> {
    tracing::info!(partners = payload.partners.len(), "Updating partner configuration");

    let (config, view) = state.ledger.update_config(payload).await?;
    Ok(Json(ConfigUpdatedResponse {
        config,
        state: view,
    }))
}

/// Clear all payments and totals; the configuration survives.
pub async fn reset_ledger(
    State(state): State<AppState>,
) -> Result<Json<StateChangedResponse>, AppError> {
    tracing::info!("Resetting ledger");

    let view = state.ledger.reset().await?;
    Ok(Json(StateChangedResponse { state: view }))
}
