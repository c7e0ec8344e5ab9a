use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use colonia_storage::models::{Account, AccountPatch, NewAccount};
use colonia_storage::{AccountRepository, StorageError};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{AppError, AppJson, AppPath};
use crate::state::AppState;

#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(request): AppJson<NewAccount>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.sign_up(request).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

#[instrument(skip(state))]
pub async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.accounts.find_all().await?))
}

#[instrument(skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<Json<Account>, AppError> {
    let account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Usuario", id))?;
    Ok(Json(account))
}

#[instrument(skip(state))]
pub async fn update_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
    AppJson(patch): AppJson<AccountPatch>,
) -> Result<Json<Account>, AppError> {
    let mut account = state
        .accounts
        .find_by_id(id)
        .await?
        .ok_or_else(|| StorageError::not_found("Usuario", id))?;

    account.apply_patch(patch, Utc::now())?;
    state.accounts.update(&account).await?;
    Ok(Json(account))
}

#[instrument(skip(state))]
pub async fn delete_account(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
