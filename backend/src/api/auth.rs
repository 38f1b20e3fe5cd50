//! Account endpoints: register, login, current user.

use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Credentials, Error, UserId, UserProfile};

use super::{authenticate, AppState};

/// Registration payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Email address; becomes the unique login.
    pub email: String,
    /// Raw password, 8..=128 characters.
    pub password: String,
}

/// Login payload.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Registered email address.
    pub email: String,
    /// Raw password.
    pub password: String,
}

/// Public account projection.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileResponse {
    /// Account identifier.
    pub id: UserId,
    /// Normalised email address.
    pub email: String,
    /// Account creation time.
    pub created_at: DateTime<Utc>,
}

impl From<UserProfile> for UserProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email.as_str().to_owned(),
            created_at: profile.created_at,
        }
    }
}

/// Token plus the account it belongs to.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// The authenticated account.
    pub user: UserProfileResponse,
}

fn parse_credentials(email: &str, password: &str) -> Result<Credentials, Error> {
    Credentials::try_from_parts(email, password).map_err(|err| {
        Error::validation(err.to_string()).with_field_error(err.field(), err.to_string())
    })
}

/// Create an account and sign in.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email or password shape", body = Error),
        (status = 409, description = "Email already registered", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register"
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, Error> {
    let credentials = parse_credentials(&body.email, &body.password)?;
    let authed = state.accounts.register(&credentials).await?;
    Ok(HttpResponse::Created().json(AuthResponse {
        token: authed.token,
        user: authed.profile.into(),
    }))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Unknown email or wrong password", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login"
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<web::Json<AuthResponse>, Error> {
    // Shape failures must read the same as a wrong password; probing which
    // emails exist through validation messages is not acceptable here.
    let credentials = Credentials::try_from_parts(&body.email, &body.password)
        .map_err(|_| Error::unauthorized("invalid email or password"))?;
    let authed = state.accounts.login(&credentials).await?;
    Ok(web::Json(AuthResponse {
        token: authed.token,
        user: authed.profile.into(),
    }))
}

/// The account behind the presented token.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current account", body = UserProfileResponse),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<web::Json<UserProfileResponse>, Error> {
    let identity = authenticate(&state, &req)?;
    let profile = state.accounts.me(&identity).await?;
    Ok(web::Json(profile.into()))
}
