//! Registration, login and the customer's own profile.

use super::{
    AppState,
    session::CurrentUser,
};
use crate::{
    core::{
        user::{self, NewUser, UserChanges},
        validation,
    },
    entities::user::{Model as UserModel, UserRole},
    errors::Result,
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Account routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
        .route("/api/profile", get(me).put(update_profile))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    password_confirmation: String,
    address: Option<String>,
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    token: String,
    user: UserModel,
}

#[derive(Debug, Deserialize)]
struct ProfileRequest {
    name: Option<String>,
    email: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    password: Option<String>,
    password_confirmation: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    validation::validate_registration(
        &req.name,
        &req.email,
        &req.password,
        &req.password_confirmation,
    )?;

    let user = user::create_user(
        &state.db,
        NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
            role: UserRole::Customer,
            address: req.address,
            phone: req.phone,
        },
    )
    .await?;

    let token = state.sessions.create(user.id).await;
    Ok((StatusCode::CREATED, Json(SessionResponse { token, user })))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let user = user::authenticate_user(&state.db, &req.email, &req.password).await?;
    let token = state.sessions.create(user.id).await;
    info!("User {} logged in", user.id);
    Ok(Json(SessionResponse { token, user }))
}

async fn logout(State(state): State<AppState>, current: CurrentUser) -> StatusCode {
    state.sessions.remove(&current.token).await;
    StatusCode::NO_CONTENT
}

async fn me(current: CurrentUser) -> Json<UserModel> {
    Json(current.user)
}

async fn update_profile(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(req): Json<ProfileRequest>,
) -> Result<Json<UserModel>> {
    // Blank password fields mean "keep the current one"
    let password = validation::non_blank(req.password);
    if let Some(password) = &password {
        validation::validate_password(password, req.password_confirmation.as_deref().unwrap_or(""))?;
    }

    let changes = UserChanges {
        name: req.name,
        email: req.email,
        password,
        role: None,
        address: req.address,
        phone: req.phone,
    };
    let user = user::update_user(&state.db, current.user.id, changes).await?;
    Ok(Json(user))
}
