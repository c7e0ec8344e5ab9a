use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use colonia_storage::models::{Announcement, AnnouncementPatch, NewAnnouncement};
use colonia_storage::{AnnouncementRepository, StorageError, current_announcements};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppJson, AppPath};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn create_announcement(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewAnnouncement>,
) -> Result<impl IntoResponse, AppError> {
    let anuncio = Announcement::publish(request, Utc::now())?;
    state.announcements.create(&anuncio).await?;
    Ok((StatusCode::CREATED, Json(anuncio)))
}

#[instrument(skip(state))]
pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    Ok(Json(state.announcements.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_announcement(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    let anuncio = state
        .announcements
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Anuncio", id))?;
    Ok(Json(anuncio))
}

/// Current announcements of a neighborhood, important and newest first
#[instrument(skip(state))]
pub async fn current_for_neighborhood(
    State(state): State<AppState>,
    AppPath(colonia_id): AppPath<Uuid>,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let fetched = state.announcements.find_by_colonia(colonia_id).await?;
    Ok(Json(current_announcements(fetched, Utc::now())))
}

#[instrument(skip(state))]
pub async fn update_announcement(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<AnnouncementPatch>,
) -> Result<Json<Announcement>, AppError> {
    let mut anuncio = state
        .announcements
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Anuncio", id))?;

    anuncio.apply_patch(patch, Utc::now());
    state.announcements.update(&anuncio).await?;
    Ok(Json(anuncio))
}

#[instrument(skip(state))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.announcements.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
