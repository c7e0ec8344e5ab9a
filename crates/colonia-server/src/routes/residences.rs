use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use colonia_storage::models::{
    NewMembership, NewResidence, Residence, ResidenceMembership, ResidencePatch,
};
use colonia_storage::{MembershipRepository, ResidenceRepository, StorageError};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppJson, AppPath};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn create_residence(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewResidence>,
) -> Result<impl IntoResponse, AppError> {
    let residence = Residence::create(request, Utc::now())?;
    state.residences.create(&residence).await?;
    Ok((StatusCode::CREATED, Json(residence)))
}

#[instrument(skip(state))]
pub async fn list_residences(
    State(state): State<AppState>,
) -> Result<Json<Vec<Residence>>, AppError> {
    Ok(Json(state.residences.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_residence(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Residence>, AppError> {
    let residence = state
        .residences
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Residencia", id))?;
    Ok(Json(residence))
}

#[instrument(skip(state))]
pub async fn update_residence(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<ResidencePatch>,
) -> Result<Json<Residence>, AppError> {
    let mut residence = state
        .residences
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Residencia", id))?;

    residence.apply_patch(patch, Utc::now());
    state.residences.update(&residence).await?;
    Ok(Json(residence))
}

#[instrument(skip(state))]
pub async fn delete_residence(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.residences.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn create_membership(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewMembership>,
) -> Result<impl IntoResponse, AppError> {
    let membership = ResidenceMembership::create(request, Utc::now());
    state.memberships.create(&membership).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

#[instrument(skip(state))]
pub async fn residences_of_account(
    State(state): State<AppState>,
    AppPath(usuario_id): AppPath<Uuid>,
) -> Result<Json<Vec<Residence>>, AppError> {
    Ok(Json(state.residences.find_by_usuario(usuario_id).await?))
}

#[instrument(skip(state))]
pub async fn verify_membership(
    State(state): State<AppState>,
    AppPath((residencia_id, usuario_id)): AppPath<(Uuid, Uuid)>,
) -> Result<Json<ResidenceMembership>, AppError> {
    let membership = state.memberships.verify(residencia_id, usuario_id).await?;
    Ok(Json(membership))
}
