/// Admin login endpoint
///
/// There is exactly one account, configured through the environment
/// (`ADMIN_USERNAME` / `ADMIN_PASSWORD_HASH`). Login hands out the 8-hour
/// bearer token the rest of the API requires.
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Authenticate and get a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Json};
use botboard_shared::auth::{jwt, password};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Admin username
    #[validate(length(min = 1, max = 100, message = "Username is required"))]
    pub username: String,

    /// Admin password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// The authenticated identity echoed back to the dashboard
#[derive(Debug, Serialize)]
pub struct LoginUser {
    pub username: String,
    pub role: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub token: String,

    /// Seconds until the token expires
    pub expires_in_seconds: i64,

    /// Who logged in
    pub user: LoginUser,
}

fn map_validation_errors(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}

/// Login handler
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "username": "admin",
///   "password": "..."
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "expires_in_seconds": 28800,
///   "user": { "username": "admin", "role": "admin" }
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Wrong username or password (indistinguishable on
///   purpose)
/// - `422 Unprocessable Entity`: Empty username or password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate().map_err(map_validation_errors)?;

    let admin = &state.config.admin;

    // Verify the hash even for an unknown username so both failure paths
    // take comparable time.
    let username_ok = req.username == admin.username;
    let password_ok = password::verify_password(&req.password, &admin.password_hash)?;

    if !username_ok || !password_ok {
        tracing::warn!(username = %req.username, "Failed admin login attempt");
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let claims = jwt::Claims::new(&admin.username);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(username = %admin.username, "Admin logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in_seconds: claims.expires_in_seconds(),
        user: LoginUser {
            username: admin.username.clone(),
            role: claims.role,
        },
    }))
}
