use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use colonia_storage::VisitFilter;
use colonia_storage::models::{NewVisitorPass, VisitorPass, VisitorPassPatch};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppJson, AppPath, AppQuery};
use crate::state::AppState;

#[instrument(skip(state))]
pub async fn issue_pass(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewVisitorPass>,
) -> Result<impl IntoResponse, AppError> {
    let pass = state.passes.issue(request).await?;
    Ok((StatusCode::CREATED, Json(pass)))
}

#[instrument(skip(state))]
pub async fn list_passes(
    State(state): State<AppState>,
    AppQuery(filter): AppQuery<VisitFilter>,
) -> Result<Json<Vec<VisitorPass>>, AppError> {
    Ok(Json(state.passes.list(&filter).await?))
}

#[instrument(skip(state))]
pub async fn get_pass(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<VisitorPass>, AppError> {
    Ok(Json(state.passes.get(id).await?))
}

#[instrument(skip(state))]
pub async fn update_pass(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<VisitorPassPatch>,
) -> Result<Json<VisitorPass>, AppError> {
    Ok(Json(state.passes.update(id, patch).await?))
}

#[instrument(skip(state))]
pub async fn delete_pass(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.passes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
pub async fn scan_pass(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<VisitorPass>, AppError> {
    Ok(Json(state.passes.scan(id).await?))
}
