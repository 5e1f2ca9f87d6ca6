//! Claims handlers

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::ClaimId;

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Submits a new claim
pub async fn submit_claim(
    State(state): State<AppState>,
    payload: Result<Json<SubmitClaimRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitClaimResponse>), ApiError> {
    let Json(request) = payload?;
    let receipt = state.service.submit_claim(request.into()).await?;
    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Reverses a submitted claim
pub async fn reverse_claim(
    State(state): State<AppState>,
    payload: Result<Json<ReverseClaimRequest>, JsonRejection>,
) -> Result<Json<ReverseClaimResponse>, ApiError> {
    let Json(request) = payload?;
    let receipt = state.service.reverse_claim(request.into()).await?;
    Ok(Json(receipt.into()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let Path(id) = id?;
    let claim = state.service.get_claim(ClaimId::from_uuid(id)).await?;
    Ok(Json(claim.into()))
}
