use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{token, AuthUser};
use crate::engine::NewUser;
use crate::models::User;
use crate::state::AppState;
use crate::store::Store;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_institute: bool,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub college: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct AuthPayload {
    user: User,
    token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let user = state
        .engine
        .identity
        .register(NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            is_institute: req.is_institute,
            first_name: req.first_name,
            last_name: req.last_name,
            contact_number: req.contact_number,
            college: req.college,
        })
        .await?;

    let token = token::issue(
        user.id,
        &user.email,
        user.role,
        &state.config.token_secret,
        state.config.token_ttl_hours,
    );
    Ok(created(
        AuthPayload { user, token },
        "User registered successfully",
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user = state
        .engine
        .identity
        .resolve(&req.email, &req.password)
        .await?;

    let token = token::issue(
        user.id,
        &user.email,
        user.role,
        &state.config.token_secret,
        state.config.token_ttl_hours,
    );
    Ok(success(AuthPayload { user, token }, "Login successful"))
}

pub async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Response, AppError> {
    let user = state
        .store
        .user_by_id(auth.0.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(success(user, "Current user"))
}
