use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser, errors::AppError, relay::dto::ResultSubmission, relay::services,
    state::AppState,
};

pub fn relay_routes() -> Router<AppState> {
    Router::new()
        .route("/encrypted-texts", get(encrypted_texts))
        .route("/decrypted-texts", post(decrypted_texts))
        .route("/decrypted-result", post(decrypted_result))
}

#[instrument(skip(state))]
pub async fn encrypted_texts(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<(StatusCode, Json<Vec<String>>), AppError> {
    let texts = services::fetch_and_store(state.texts.as_ref(), state.upstream.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(texts)))
}

#[instrument(skip(state))]
pub async fn decrypted_texts(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<(StatusCode, Json<Vec<String>>), AppError> {
    let texts =
        services::decrypt_and_update(state.texts.as_ref(), state.upstream.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(texts)))
}

#[instrument(skip(state))]
pub async fn decrypted_result(
    State(state): State<AppState>,
) -> Result<Json<ResultSubmission>, AppError> {
    let payload = services::submit_result(
        state.texts.as_ref(),
        state.upstream.as_ref(),
        &state.config.upstream,
    )
    .await?;
    Ok(Json(payload))
}
