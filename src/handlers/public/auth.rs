// Public authentication handlers: account creation, login, token exchange
// and profile mutation. Every route validates its own fields and maps
// session errors onto the route's historical status codes.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::TokenIssuer;
use crate::database::manager::DatabaseManager;
use crate::database::users::PgUserStore;
use crate::error::ApiError;
use crate::services::session::{SessionError, SessionService};

async fn session_service() -> Result<SessionService<PgUserStore>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let tokens = TokenIssuer::from_config()?;
    Ok(SessionService::new(PgUserStore::new(pool), tokens))
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub email: Option<String>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    #[serde(rename = "newPassword")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailRequest {
    #[serde(rename = "oldEmail")]
    pub old_email: Option<String>,
    #[serde(rename = "newEmail")]
    pub new_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: Option<String>,
}

/// POST /create-user - Register a new account
pub async fn create_user(
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let sessions = session_service().await?;
    let session = sessions.signup(&email, &password).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User Created Successfully",
            "accessToken": session.access_token,
            "refreshToken": session.refresh_token,
            "user": { "id": session.user.id, "email": session.user.email },
        })),
    ))
}

/// POST /login - Authenticate with email and password
pub async fn login(Json(payload): Json<CredentialsRequest>) -> Result<Json<Value>, ApiError> {
    let (email, password) = match (payload.email, payload.password) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let sessions = session_service().await?;
    let session = sessions.login(&email, &password).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Login successfully!",
        "accessToken": session.access_token,
        "refreshToken": session.refresh_token,
        "user": session.user.public(),
    })))
}

/// POST /token - Exchange a refresh token for a new access token
pub async fn token(Json(payload): Json<RefreshTokenRequest>) -> Result<Json<Value>, ApiError> {
    let refresh_token = payload
        .refresh_token
        .ok_or_else(|| ApiError::unauthorized("Refresh token required"))?;

    let sessions = session_service().await?;
    let access_token = sessions.refresh(&refresh_token).await?;

    Ok(Json(json!({ "accessToken": access_token })))
}

/// POST /logout - Revoke a single refresh token
pub async fn logout(Json(payload): Json<RefreshTokenRequest>) -> Result<Json<Value>, ApiError> {
    let refresh_token = payload
        .refresh_token
        .ok_or_else(|| ApiError::bad_request("Refresh token required"))?;

    let sessions = session_service().await?;
    sessions.logout(&refresh_token).await.map_err(|err| match err {
        SessionError::InvalidRefreshToken => ApiError::bad_request("Invalid refresh token"),
        SessionError::UserNotFound => ApiError::bad_request("User not found"),
        other => other.into(),
    })?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

/// PUT /change-password
pub async fn change_password(
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let (email, old_password, new_password) =
        match (payload.email, payload.old_password, payload.new_password) {
            (Some(email), Some(old), Some(new)) => (email, old, new),
            _ => return Err(ApiError::bad_request("All fields are required")),
        };

    let sessions = session_service().await?;
    sessions
        .change_password(&email, &old_password, &new_password)
        .await
        .map_err(|err| match err {
            SessionError::UserNotFound => ApiError::not_found("User not found"),
            SessionError::WrongPassword => ApiError::unauthorized("Old password is incorrect"),
            other => other.into(),
        })?;

    Ok(Json(json!({ "message": "Password changed successfully" })))
}

/// PUT /update-email
pub async fn update_email(
    Json(payload): Json<UpdateEmailRequest>,
) -> Result<Json<Value>, ApiError> {
    let (old_email, new_email) = match (payload.old_email, payload.new_email) {
        (Some(old), Some(new)) => (old, new),
        _ => return Err(ApiError::bad_request("Old and new email required")),
    };

    let sessions = session_service().await?;
    let email = sessions
        .update_email(&old_email, &new_email)
        .await
        .map_err(|err| match err {
            SessionError::UserNotFound => ApiError::not_found("User not found"),
            other => other.into(),
        })?;

    Ok(Json(json!({
        "message": "Email updated successfully. Please Login again!",
        "email": email,
    })))
}

/// POST /google-signup - Existence probe before a Google signup
pub async fn google_signup(Json(payload): Json<EmailRequest>) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let sessions = session_service().await?;
    // The `error` field doubles as the can-sign-up signal for the web client.
    match sessions.google_lookup(&email).await? {
        None => Ok(Json(json!({ "success": true, "error": "User not exists!" }))),
        Some(_) => Ok(Json(
            json!({ "success": false, "message": "User exist. Please Login" }),
        )),
    }
}

/// POST /google-login - Issue tokens for an externally-verified email
pub async fn google_login(Json(payload): Json<EmailRequest>) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let sessions = session_service().await?;
    let session = sessions.google_login(&email).await.map_err(|err| match err {
        SessionError::UserNotFound => ApiError::not_found("User not exists!"),
        other => other.into(),
    })?;

    Ok(Json(json!({
        "success": true,
        "message": "Login Successfully!",
        "accessToken": session.access_token,
        "refreshToken": session.refresh_token,
        "user": session.user.public(),
    })))
}

/// POST /auth/google - Find-or-create an account for a Google-verified email
pub async fn google_auth(Json(payload): Json<EmailRequest>) -> Result<Json<Value>, ApiError> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::bad_request("Email is required"))?;

    let sessions = session_service().await?;
    let user = sessions
        .find_or_create_google_user(&email)
        .await
        .map_err(|err| {
            tracing::error!("google user creation failed: {}", err);
            ApiError::internal_server_error("User creation failed")
        })?;

    Ok(Json(json!(user.public())))
}
