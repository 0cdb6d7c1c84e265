use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{error, info, instrument};

use crate::{
    auth::{
        dto::{PublicUser, TokenForm, TokenResponse},
        extractors::AuthUser,
        jwt::JwtKeys,
    },
    errors::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/token", post(login_for_access_token))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .user
        .authenticate(&form.username, &form.password)
        .map_err(|e| {
            error!(error = %e, "verify_password failed");
            AppError::Internal(e)
        })?
        .ok_or(AppError::InvalidCredentials)?;

    let access_token = JwtKeys::from_ref(&state).sign(&user.email)?;

    info!(username = %user.email, "token issued");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = state.user.find(&username).ok_or(AppError::Unauthorized)?;
    Ok(Json(user.public()))
}
