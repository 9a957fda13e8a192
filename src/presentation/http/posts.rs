use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::application::use_cases::posts::create_post::{
    CreatePost as CreatePostUc, CreatePostRequest as CreatePostDto,
};
use crate::application::use_cases::posts::delete_post::DeletePost as DeletePostUc;
use crate::application::use_cases::posts::get_post::GetPost;
use crate::application::use_cases::posts::update_post::UpdatePost as UpdatePostUc;
use crate::bootstrap::app_context::AppContext;
use crate::domain::posts::{Post, PostUpdate};
use crate::presentation::http::auth::{self, Bearer};
use crate::presentation::http::error::{ApiError, Flash};

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub story: String,
    pub image_urls: Vec<String>,
    pub univ: String,
    pub city: String,
    pub cost_per_person: i32,
    pub date_posted: chrono::DateTime<chrono::Utc>,
    pub author: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    #[validate(length(min = 1, max = 120, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "story must not be empty"))]
    pub story: String,
    #[validate(length(min = 1, message = "univ must not be empty"))]
    pub univ: String,
    #[validate(length(min = 1, message = "city must not be empty"))]
    pub city: String,
    #[validate(range(min = 0, message = "cost per person cannot be negative"))]
    pub cost_per_person: i32,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct NewPostMultipart {
    title: String,
    story: String,
    univ: String,
    city: String,
    cost_per_person: i32,
    /// Repeated field; each picture is resized to fit 480x600
    #[schema(value_type = Option<String>, format = Binary)]
    pictures: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/post/new", post(new_post))
        .route("/post/:id", get(get_post))
        // Browser forms can only POST; accept that alongside the verb-shaped
        // methods.
        .route("/post/:id/update", put(update_post).post(update_post))
        .route("/post/:id/delete", delete(delete_post).post(delete_post))
        .with_state(ctx)
}

pub fn post_response(p: &Post) -> PostResponse {
    PostResponse {
        id: p.id,
        title: p.title.clone(),
        story: p.story.clone(),
        image_urls: p
            .images
            .iter()
            .map(|f| format!("/static/post_pics/{f}"))
            .collect(),
        univ: p.univ.clone(),
        city: p.city.clone(),
        cost_per_person: p.cost_per_person,
        date_posted: p.date_posted,
        author: p.author.clone(),
    }
}

/// POST /post/new (multipart/form-data)
/// Fields:
/// - title, story, univ, city, cost_per_person: required text
/// - pictures: zero or more image uploads
#[utoipa::path(post, path = "/post/new", tag = "Posts",
    request_body(content = NewPostMultipart, content_type = "multipart/form-data"),
    responses((status = 201, body = PostDetailResponse)))]
pub async fn new_post(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    mut multipart: Multipart,
) -> Result<(axum::http::StatusCode, Json<PostDetailResponse>), ApiError> {
    let user_id = auth::validate_bearer(&ctx.cfg, bearer)?;

    let mut title: Option<String> = None;
    let mut story: Option<String> = None;
    let mut univ: Option<String> = None;
    let mut city: Option<String> = None;
    let mut cost_per_person: Option<i32> = None;
    let mut pictures: Vec<(Vec<u8>, Option<String>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::Validation("malformed multipart body".into()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => title = Some(read_text(field).await?),
            Some("story") => story = Some(read_text(field).await?),
            Some("univ") => univ = Some(read_text(field).await?),
            Some("city") => city = Some(read_text(field).await?),
            Some("cost_per_person") => {
                let raw = read_text(field).await?;
                cost_per_person = Some(raw.trim().parse().map_err(|_| {
                    ApiError::Validation("cost_per_person must be a whole number".into())
                })?);
            }
            Some("pictures") => {
                let file_name = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::Validation("bad picture upload".into()))?;
                if !data.is_empty() {
                    pictures.push((data.to_vec(), file_name));
                }
            }
            _ => { /* ignore additional fields */ }
        }
    }

    let form = UpdatePostRequest {
        title: title.ok_or(ApiError::Validation("title is required".into()))?,
        story: story.ok_or(ApiError::Validation("story is required".into()))?,
        univ: univ.ok_or(ApiError::Validation("univ is required".into()))?,
        city: city.ok_or(ApiError::Validation("city is required".into()))?,
        cost_per_person: cost_per_person
            .ok_or(ApiError::Validation("cost_per_person is required".into()))?,
    };
    form.validate()?;

    let repo = ctx.post_repo();
    let images = ctx.image_store();
    let uc = CreatePostUc {
        repo: repo.as_ref(),
        images: images.as_ref(),
    };
    let created = uc
        .execute(
            user_id,
            CreatePostDto {
                title: form.title,
                story: form.story,
                univ: form.univ,
                city: form.city,
                cost_per_person: form.cost_per_person,
                pictures,
            },
        )
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(PostDetailResponse {
            post: post_response(&created),
            flash: Some(Flash::success("Your post has been created!")),
        }),
    ))
}

#[utoipa::path(get, path = "/post/{id}", tag = "Posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    security(()),
    responses((status = 200, body = PostDetailResponse), (status = 404)))]
pub async fn get_post(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let repo = ctx.post_repo();
    let uc = GetPost {
        repo: repo.as_ref(),
    };
    let post = uc.execute(id).await?.ok_or(ApiError::NotFound("post not found"))?;
    Ok(Json(PostDetailResponse {
        post: post_response(&post),
        flash: None,
    }))
}

#[utoipa::path(put, path = "/post/{id}/update", tag = "Posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, body = PostDetailResponse),
        (status = 403, description = "Not the author"),
        (status = 404)
    ))]
pub async fn update_post(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<PostDetailResponse>, ApiError> {
    let user_id = auth::validate_bearer(&ctx.cfg, bearer)?;
    req.validate()?;
    let repo = ctx.post_repo();
    let uc = UpdatePostUc {
        repo: repo.as_ref(),
    };
    let updated = uc
        .execute(
            id,
            user_id,
            PostUpdate {
                title: req.title,
                story: req.story,
                univ: req.univ,
                city: req.city,
                cost_per_person: req.cost_per_person,
            },
        )
        .await?;
    Ok(Json(PostDetailResponse {
        post: post_response(&updated),
        flash: Some(Flash::success("Your post has been updated!")),
    }))
}

#[utoipa::path(delete, path = "/post/{id}/delete", tag = "Posts",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 403, description = "Not the author"),
        (status = 404)
    ))]
pub async fn delete_post(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user_id = auth::validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.post_repo();
    let uc = DeletePostUc {
        repo: repo.as_ref(),
    };
    uc.execute(id, user_id).await?;
    Ok(Json(serde_json::json!({
        "flash": Flash::success("Your post has been deleted!"),
        "redirect_to": "/home",
    })))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::Validation("malformed multipart field".into()))
}
