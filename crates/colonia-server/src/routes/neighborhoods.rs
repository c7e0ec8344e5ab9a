use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use colonia_storage::models::{NewNeighborhood, Neighborhood, NeighborhoodPatch, Residence};
use colonia_storage::{NeighborhoodRepository, ResidenceRepository, StorageError};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppJson, AppPath};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GeneratedResidence {
    pub id: Uuid,
    /// Claim code handed to the future resident
    pub codigo: Uuid,
}

#[derive(Debug, Serialize)]
pub struct GeneratedResidences {
    pub residencias_generadas: Vec<GeneratedResidence>,
}

#[instrument(skip(state))]
pub async fn create_neighborhood(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewNeighborhood>,
) -> Result<impl IntoResponse, AppError> {
    let colonia = Neighborhood::create(request, Utc::now())?;
    state.neighborhoods.create(&colonia).await?;
    Ok((StatusCode::CREATED, Json(colonia)))
}

#[instrument(skip(state))]
pub async fn list_neighborhoods(
    State(state): State<AppState>,
) -> Result<Json<Vec<Neighborhood>>, AppError> {
    Ok(Json(state.neighborhoods.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_neighborhood(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Neighborhood>, AppError> {
    let colonia = state
        .neighborhoods
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Colonia", id))?;
    Ok(Json(colonia))
}

#[instrument(skip(state))]
pub async fn update_neighborhood(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<NeighborhoodPatch>,
) -> Result<Json<Neighborhood>, AppError> {
    let mut colonia = state
        .neighborhoods
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Colonia", id))?;

    colonia.apply_patch(patch, Utc::now());
    state.neighborhoods.update(&colonia).await?;
    Ok(Json(colonia))
}

#[instrument(skip(state))]
pub async fn delete_neighborhood(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.neighborhoods.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn residences_of_neighborhood(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Vec<Residence>>, AppError> {
    Ok(Json(state.residences.find_by_colonia(id).await?))
}

#[instrument(skip(state))]
pub async fn generate_residence_codes(
    State(state): State<AppState>,
    AppPath((id, cantidad)): AppPath<(Uuid, u32)>,
) -> Result<impl IntoResponse, AppError> {
    let ids = state.residences.create_placeholders(id, cantidad).await?;

    let body = GeneratedResidences {
        residencias_generadas: ids
            .into_iter()
            .map(|id| GeneratedResidence { id, codigo: id })
            .collect(),
    };
    Ok((StatusCode::CREATED, Json(body)))
}
