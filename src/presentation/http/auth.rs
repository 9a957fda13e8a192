use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::use_cases::auth::login::{Login as LoginUc, LoginRequest as LoginDto};
use crate::application::use_cases::auth::register::{
    Register as RegisterUc, RegisterRequest as RegisterDto,
};
use crate::application::use_cases::auth::request_password_reset::RequestPasswordReset;
use crate::application::use_cases::auth::reset_password::ResetPassword as ResetPasswordUc;
use crate::bootstrap::app_context::AppContext;
use crate::bootstrap::config::Config;
use crate::presentation::http::error::{ApiError, Flash};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 20, message = "username must be 2 to 20 characters"))]
    pub username: String,
    #[validate(email(message = "that does not look like an email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub user: UserResponse,
    pub flash: Flash,
    pub redirect_to: &'static str,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    /// The page the client originally asked for, echoed back on success.
    pub next: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub user: UserResponse,
    pub redirect_to: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetRequestForm {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordForm {
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FlashResponse {
    pub flash: Flash,
    pub redirect_to: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Reset tokens are ordinary signed JWTs with a dedicated purpose claim so
/// an access token can never pass for one.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResetClaims {
    pub sub: String,
    pub purpose: String,
    pub exp: usize,
}

const RESET_PURPOSE: &str = "password_reset";

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/reset_password", post(reset_request))
        .route("/reset_password/:token", post(reset_token))
        .with_state(ctx)
}

pub fn user_response(user: &crate::domain::users::User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: format!("/static/profile_pics/{}", user.image_file),
    }
}

#[utoipa::path(post, path = "/register", tag = "Auth", request_body = RegisterRequest, security(()), responses(
    (status = 200, body = RegisterResponse),
    (status = 409, description = "Email or username already taken")
))]
pub async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    req.validate()?;
    let repo = ctx.user_repo();
    let uc = RegisterUc {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&RegisterDto {
            username: req.username.clone(),
            email: req.email.clone(),
            password: req.password.clone(),
        })
        .await?;
    Ok(Json(RegisterResponse {
        user: user_response(&user),
        flash: Flash::success("Your account has been created! You are now able to log in"),
        redirect_to: "/login",
    }))
}

#[utoipa::path(post, path = "/login", tag = "Auth", request_body = LoginRequest, security(()), responses(
    (status = 200, body = LoginResponse),
    (status = 401, description = "Bad email or password")
))]
pub async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    req.validate()?;
    let repo = ctx.user_repo();
    let uc = LoginUc {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(&LoginDto {
            email: req.email.clone(),
            password: req.password.clone(),
        })
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let token = issue_access_token(&ctx.cfg, user.id)?;

    let redirect_to = sanitize_next(req.next);

    let mut headers = HeaderMap::new();
    let secure = ctx
        .cfg
        .frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false);
    let cookie = build_access_cookie(&token, ctx.cfg.jwt_expires_secs, secure);
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(&cookie)
            .unwrap_or(axum::http::HeaderValue::from_static("")),
    );

    Ok((
        headers,
        Json(LoginResponse {
            access_token: token,
            user: user_response(&user),
            redirect_to,
        }),
    ))
}

#[utoipa::path(post, path = "/logout", tag = "Auth", responses((status = 204)))]
pub async fn logout(State(ctx): State<AppContext>) -> Result<(HeaderMap, StatusCode), ApiError> {
    // Clear the cookie by setting it expired
    let mut headers = HeaderMap::new();
    let secure = ctx
        .cfg
        .frontend_url
        .as_deref()
        .map(|u| u.starts_with("https://"))
        .unwrap_or(false);
    let cookie = if secure {
        "access_token=; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Lax"
    } else {
        "access_token=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax"
    };
    headers.insert(
        axum::http::header::SET_COOKIE,
        axum::http::HeaderValue::from_str(cookie)
            .unwrap_or(axum::http::HeaderValue::from_static("")),
    );
    Ok((headers, StatusCode::NO_CONTENT))
}

#[utoipa::path(post, path = "/reset_password", tag = "Auth", request_body = ResetRequestForm, security(()), responses(
    (status = 200, body = FlashResponse)
))]
pub async fn reset_request(
    State(ctx): State<AppContext>,
    Json(req): Json<ResetRequestForm>,
) -> Result<Json<FlashResponse>, ApiError> {
    req.validate()?;
    let repo = ctx.user_repo();
    let mailer = ctx.mailer();
    let uc = RequestPasswordReset {
        repo: repo.as_ref(),
        mailer: mailer.as_ref(),
    };
    let cfg = ctx.cfg.clone();
    uc.execute(&req.email, |user| {
        let token = issue_reset_token(&cfg, user.id)?;
        Ok(format!("{}/reset_password/{}", reset_link_base(&cfg), token))
    })
    .await?;
    Ok(Json(FlashResponse {
        flash: Flash::info("An email has been sent with instructions to reset your password."),
        redirect_to: "/login",
    }))
}

#[utoipa::path(post, path = "/reset_password/{token}", tag = "Auth",
    params(("token" = String, Path, description = "Signed reset token")),
    request_body = ResetPasswordForm,
    security(()),
    responses(
        (status = 200, body = FlashResponse),
        (status = 400, description = "Invalid or expired token", body = FlashResponse)
    ))]
pub async fn reset_token(
    State(ctx): State<AppContext>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordForm>,
) -> Result<Json<FlashResponse>, axum::response::Response> {
    use axum::response::IntoResponse;

    let rejection = || {
        (
            StatusCode::BAD_REQUEST,
            Json(FlashResponse {
                flash: Flash::warning("That is an invalid or expired token"),
                redirect_to: "/reset_password",
            }),
        )
            .into_response()
    };

    req.validate()
        .map_err(|e| ApiError::from(e).into_response())?;
    let user_id = verify_reset_token(&ctx.cfg, &token).ok_or_else(rejection)?;
    let repo = ctx.user_repo();
    let uc = ResetPasswordUc {
        repo: repo.as_ref(),
    };
    let changed = uc
        .execute(user_id, &req.password)
        .await
        .map_err(|e| ApiError::Internal(e).into_response())?;
    if !changed {
        // Token subject no longer exists; indistinguishable from a stale token.
        return Err(rejection());
    }
    Ok(Json(FlashResponse {
        flash: Flash::success("Your password has been updated! You are now able to log in"),
        redirect_to: "/login",
    }))
}

// --- Bearer extractor & JWT utils ---
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub struct Bearer(pub String);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // 1) Prefer Authorization header if present
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(t) = auth.strip_prefix("Bearer ") {
                return Ok(Bearer(t.to_string()));
            }
        }

        // 2) Fallback to HttpOnly cookie `access_token`
        if let Some(cookie_hdr) = parts
            .headers
            .get(axum::http::header::COOKIE)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = get_cookie(cookie_hdr, "access_token") {
                return Ok(Bearer(token));
            }
        }

        Err(ApiError::Unauthorized)
    }
}

pub fn issue_access_token(cfg: &Config, user_id: Uuid) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + (cfg.jwt_expires_secs as usize),
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!(e)))
}

pub fn validate_bearer(cfg: &Config, bearer: Bearer) -> Result<Uuid, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(
        &bearer.0,
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;
    Uuid::parse_str(&data.claims.sub).map_err(|_| ApiError::Unauthorized)
}

pub fn issue_reset_token(cfg: &Config, user_id: Uuid) -> anyhow::Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = ResetClaims {
        sub: user_id.to_string(),
        purpose: RESET_PURPOSE.to_string(),
        exp: (now + cfg.reset_token_expires_secs) as usize,
    };
    Ok(jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.jwt_secret.as_bytes()),
    )?)
}

/// `None` for anything but a live, well-formed reset token. There is no
/// single-use bookkeeping; a token stays valid until it expires.
pub fn verify_reset_token(cfg: &Config, token: &str) -> Option<Uuid> {
    let data = jsonwebtoken::decode::<ResetClaims>(
        token,
        &DecodingKey::from_secret(cfg.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .ok()?;
    if data.claims.purpose != RESET_PURPOSE {
        return None;
    }
    Uuid::parse_str(&data.claims.sub).ok()
}

/// Only site-local absolute paths are echoed back as the post-login target;
/// protocol-relative (`//host`) and external URLs fall back to the feed.
fn sanitize_next(next: Option<String>) -> String {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//"))
        .unwrap_or_else(|| "/home".to_string())
}

fn reset_link_base(cfg: &Config) -> String {
    cfg.public_base_url
        .clone()
        .or_else(|| cfg.frontend_url.clone())
        .unwrap_or_else(|| format!("http://localhost:{}", cfg.api_port))
}

// --- Cookie helpers ---

fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    for part in cookie_header.split(';') {
        let kv = part.trim();
        if let Some((k, v)) = kv.split_once('=') {
            if k.trim() == name {
                return Some(v.trim().to_string());
            }
        }
    }
    None
}

fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    // SameSite=Lax for typical same-site SPA/API setups.
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "access_token={}; HttpOnly{}; Path=/; Max-Age={}; SameSite=Lax",
        token,
        secure_attr,
        max_age_secs.max(0)
    )
}
