use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::use_cases::posts::latest_posts::LatestPosts;
use crate::application::use_cases::posts::list_posts::ListPosts;
use crate::application::use_cases::posts::search_posts::{self, SearchPosts};
use crate::application::use_cases::posts::tag_posts::TagPosts;
use crate::application::use_cases::posts::user_posts::UserPosts;
use crate::bootstrap::app_context::AppContext;
use crate::domain::pagination::Page;
use crate::domain::posts::Post;
use crate::presentation::http::auth::{self, Bearer, UserResponse, user_response};
use crate::presentation::http::error::{ApiError, ErrorBody, Flash};
use crate::presentation::http::posts::{PostResponse, post_response};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostListResponse {
    pub items: Vec<PostResponse>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_prev: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<Flash>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPostsResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub posts: PostListResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AboutResponse {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchRequest {
    pub univ: Option<String>,
    pub city: Option<String>,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/home", get(home))
        .route("/latestposts", get(latest))
        .route("/about", get(about))
        .route("/search", post(search))
        .route("/user/:username", get(user_posts))
        .route("/posts/:tag", get(tag_posts))
        .with_state(ctx)
}

fn list_response(page: Page<Post>, flash: Option<Flash>) -> PostListResponse {
    PostListResponse {
        total_pages: page.total_pages(),
        has_prev: page.has_prev(),
        has_next: page.has_next(),
        items: page.items.iter().map(post_response).collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        flash,
    }
}

/// The landing page: an authenticated caller is sent straight to the feed,
/// everyone else gets a pointer at the login endpoint.
#[utoipa::path(get, path = "/", tag = "Pages", security(()), responses(
    (status = 303, description = "Authenticated; see /home"),
    (status = 200, description = "Login required")
))]
pub async fn root(State(ctx): State<AppContext>, bearer: Option<Bearer>) -> Response {
    if let Some(b) = bearer {
        if auth::validate_bearer(&ctx.cfg, b).is_ok() {
            return Redirect::to("/home").into_response();
        }
    }
    Json(serde_json::json!({
        "name": "roamlog",
        "message": "log in at POST /login or create an account at POST /register",
    }))
    .into_response()
}

#[utoipa::path(get, path = "/home", tag = "Pages",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    responses((status = 200, body = PostListResponse)))]
pub async fn home(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Query(q): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    auth::validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.post_repo();
    let uc = ListPosts {
        repo: repo.as_ref(),
    };
    let page = uc.execute(q.page).await?;
    Ok(Json(list_response(page, None)))
}

#[utoipa::path(get, path = "/latestposts", tag = "Pages",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    responses((status = 200, body = PostListResponse)))]
pub async fn latest(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Query(q): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    auth::validate_bearer(&ctx.cfg, bearer)?;
    let repo = ctx.post_repo();
    let uc = LatestPosts {
        repo: repo.as_ref(),
    };
    let page = uc.execute(q.page).await?;
    Ok(Json(list_response(page, None)))
}

#[utoipa::path(get, path = "/about", tag = "Pages", security(()), responses((status = 200, body = AboutResponse)))]
pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: "roamlog",
        description: "Travel and stay stories from students, with the city, \
                      the university and what it cost per person.",
    })
}

/// POST /search with optional `univ` and `city`; at least one is required.
/// Field combinations pick the ordering, see `search_posts::plan`.
#[utoipa::path(post, path = "/search", tag = "Pages",
    params(("page" = Option<i64>, Query, description = "1-based page number")),
    request_body = SearchRequest,
    responses(
        (status = 200, body = PostListResponse),
        (status = 422, description = "Neither univ nor city given")
    ))]
pub async fn search(
    State(ctx): State<AppContext>,
    bearer: Bearer,
    Query(q): Query<PageQuery>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<PostListResponse>, ApiError> {
    auth::validate_bearer(&ctx.cfg, bearer)?;
    let (filter, order) = search_posts::plan(req.univ.as_deref(), req.city.as_deref())
        .ok_or(ApiError::Validation("fill in a university or a city".into()))?;
    let repo = ctx.post_repo();
    let uc = SearchPosts {
        repo: repo.as_ref(),
    };
    let page = uc.execute(filter, order, q.page).await?;
    Ok(Json(list_response(
        page,
        Some(Flash::success("Here are your stories!!")),
    )))
}

#[utoipa::path(get, path = "/user/{username}", tag = "Pages",
    params(
        ("username" = String, Path, description = "Author username"),
        ("page" = Option<i64>, Query, description = "1-based page number")
    ),
    security(()),
    responses((status = 200, body = UserPostsResponse), (status = 404)))]
pub async fn user_posts(
    State(ctx): State<AppContext>,
    Path(username): Path<String>,
    Query(q): Query<PageQuery>,
) -> Result<Json<UserPostsResponse>, ApiError> {
    let users = ctx.user_repo();
    let posts = ctx.post_repo();
    let uc = UserPosts {
        users: users.as_ref(),
        posts: posts.as_ref(),
    };
    let (user, page) = uc
        .execute(&username, q.page)
        .await?
        .ok_or(ApiError::NotFound("no such user"))?;
    Ok(Json(UserPostsResponse {
        user: user_response(&user),
        posts: list_response(page, None),
    }))
}

/// Location browse; the tag matches either a city or a university name.
#[utoipa::path(get, path = "/posts/{tag}", tag = "Pages",
    params(
        ("tag" = String, Path, description = "City or university name"),
        ("page" = Option<i64>, Query, description = "1-based page number")
    ),
    security(()),
    responses((status = 200, body = PostListResponse)))]
pub async fn tag_posts(
    State(ctx): State<AppContext>,
    Path(tag): Path<String>,
    Query(q): Query<PageQuery>,
) -> Result<Json<PostListResponse>, ApiError> {
    let repo = ctx.post_repo();
    let uc = TagPosts {
        repo: repo.as_ref(),
    };
    let page = uc.execute(&tag, q.page).await?;
    Ok(Json(list_response(page, None)))
}

/// Custom 404 body for unmatched routes.
pub async fn not_found() -> Response {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not Found",
            message: "that page does not exist".into(),
            flash: None,
        }),
    )
        .into_response()
}
