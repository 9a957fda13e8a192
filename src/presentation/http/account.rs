use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::get,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::use_cases::auth::get_account::GetAccount;
use crate::application::use_cases::auth::update_account::{
    UpdateAccount as UpdateAccountUc, UpdateAccountRequest as UpdateAccountDto,
};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::{self, Bearer, UserResponse, user_response};
use crate::presentation::http::error::{ApiError, Flash};

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    pub user: UserResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

#[derive(Debug, Validate)]
struct AccountForm {
    #[validate(length(min = 2, max = 20, message = "username must be 2 to 20 characters"))]
    username: String,
    #[validate(email(message = "that does not look like an email address"))]
    email: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UpdateAccountMultipart {
    /// New username
    username: String,
    /// New email address
    email: String,
    /// Optional replacement profile picture
    #[schema(value_type = Option<String>, format = Binary)]
    picture: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/account", get(account).patch(update_account))
        .with_state(ctx)
}

#[utoipa::path(get, path = "/account", tag = "Account", responses((status = 200, body = AccountResponse)))]
pub async fn account(
    State(ctx): State<AppContext>,
    bearer: Bearer,
) -> Result<Json<AccountResponse>, ApiError> {
    let user_id = auth::validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.user_repo();
    let uc = GetAccount {
        repo: repo.as_ref(),
    };
    let user = uc
        .execute(user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(AccountResponse {
        user: user_response(&user),
        flash: None,
    }))
}

/// PATCH /account (multipart/form-data)
/// Fields:
/// - username, email: required text
/// - picture: optional image upload, resized to a 125x125 thumbnail
#[utoipa::path(patch, path = "/account", tag = "Account",
    request_body(content = UpdateAccountMultipart, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = AccountResponse),
        (status = 409, description = "Email or username already taken")
    ))]
pub async fn update_account(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    mut multipart: Multipart,
) -> Result<Json<AccountResponse>, ApiError> {
    let user_id = auth::validate_bearer(&ctx.cfg, bearer)?;

    let mut username: Option<String> = None;
    let mut email: Option<String> = None;
    let mut picture: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("malformed multipart body".into()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("username") => {
                username = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("bad username field".into()))?,
                );
            }
            Some("email") => {
                email = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::Validation("bad email field".into()))?,
                );
            }
            Some("picture") => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("bad picture field".into()))?;
                if !data.is_empty() {
                    picture = Some((data.to_vec(), file_name));
                }
            }
            _ => { /* ignore additional fields */ }
        }
    }

    let form = AccountForm {
        username: username.ok_or(ApiError::Validation("username is required".into()))?,
        email: email.ok_or(ApiError::Validation("email is required".into()))?,
    };
    form.validate()?;

    let repo = ctx.user_repo();
    let images = ctx.image_store();
    let uc = UpdateAccountUc {
        repo: repo.as_ref(),
        images: images.as_ref(),
    };
    let user = uc
        .execute(
            user_id,
            UpdateAccountDto {
                username: form.username,
                email: form.email,
                picture,
            },
        )
        .await?;
    Ok(Json(AccountResponse {
        user: user_response(&user),
        flash: Some(Flash::success("Your account has been updated!")),
    }))
}
