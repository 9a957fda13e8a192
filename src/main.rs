use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::MatchedPath;
use dotenvy::dotenv;
use http::HeaderValue;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use roamlog::bootstrap::app_context::{AppContext, AppServices};
use roamlog::bootstrap::config::Config;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            roamlog::presentation::http::auth::register,
            roamlog::presentation::http::auth::login,
            roamlog::presentation::http::auth::logout,
            roamlog::presentation::http::auth::reset_request,
            roamlog::presentation::http::auth::reset_token,
            roamlog::presentation::http::account::account,
            roamlog::presentation::http::account::update_account,
            roamlog::presentation::http::posts::new_post,
            roamlog::presentation::http::posts::get_post,
            roamlog::presentation::http::posts::update_post,
            roamlog::presentation::http::posts::delete_post,
            roamlog::presentation::http::pages::root,
            roamlog::presentation::http::pages::home,
            roamlog::presentation::http::pages::latest,
            roamlog::presentation::http::pages::about,
            roamlog::presentation::http::pages::search,
            roamlog::presentation::http::pages::user_posts,
            roamlog::presentation::http::pages::tag_posts,
            roamlog::presentation::http::health::health,
        ),
        components(schemas(
            roamlog::presentation::http::auth::RegisterRequest,
            roamlog::presentation::http::auth::RegisterResponse,
            roamlog::presentation::http::auth::LoginRequest,
            roamlog::presentation::http::auth::LoginResponse,
            roamlog::presentation::http::auth::UserResponse,
            roamlog::presentation::http::auth::ResetRequestForm,
            roamlog::presentation::http::auth::ResetPasswordForm,
            roamlog::presentation::http::auth::FlashResponse,
            roamlog::presentation::http::account::AccountResponse,
            roamlog::presentation::http::account::UpdateAccountMultipart,
            roamlog::presentation::http::posts::PostResponse,
            roamlog::presentation::http::posts::PostDetailResponse,
            roamlog::presentation::http::posts::UpdatePostRequest,
            roamlog::presentation::http::posts::NewPostMultipart,
            roamlog::presentation::http::pages::PostListResponse,
            roamlog::presentation::http::pages::UserPostsResponse,
            roamlog::presentation::http::pages::AboutResponse,
            roamlog::presentation::http::pages::SearchRequest,
            roamlog::presentation::http::error::Flash,
            roamlog::presentation::http::error::ErrorBody,
            roamlog::presentation::http::health::HealthResp,
        )),
        tags(
            (name = "Auth", description = "Registration, sessions and password resets"),
            (name = "Account", description = "Profile management"),
            (name = "Posts", description = "Travel stories"),
            (name = "Pages", description = "Feeds, search and browsing"),
            (name = "Health", description = "System health checks")
        )
    )]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "roamlog=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting roamlog backend");

    // Database
    let pool = roamlog::infrastructure::db::connect_pool(&cfg.database_url).await?;
    roamlog::infrastructure::db::migrate(&pool).await?;

    let user_repo = Arc::new(
        roamlog::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository::new(
            pool.clone(),
        ),
    );
    let post_repo = Arc::new(
        roamlog::infrastructure::db::repositories::post_repository_sqlx::SqlxPostRepository::new(
            pool.clone(),
        ),
    );
    let image_store = Arc::new(roamlog::infrastructure::images::FsImageStore::new(
        &cfg.uploads_dir,
    )?);
    let mailer = Arc::new(roamlog::infrastructure::mail::SmtpMailer::from_config(&cfg)?);

    let services = AppServices::new(user_repo, post_repo, image_store, mailer);
    let ctx = AppContext::new(cfg.clone(), services);

    // Build CORS
    let cors = if let Some(origin) = cfg.frontend_url.clone() {
        match HeaderValue::from_str(&origin) {
            Ok(v) => CorsLayer::new()
                .allow_origin(v)
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
            Err(_) => CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::DELETE,
                    http::Method::PATCH,
                    http::Method::OPTIONS,
                ])
                .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
                .allow_credentials(true),
        }
    } else if cfg.is_production {
        // In production FRONTEND_URL is mandatory (enforced earlier); deny all as a fallback
        CorsLayer::new()
            .allow_origin(AllowOrigin::exact(HeaderValue::from_static("http://invalid")))
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::PATCH,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
    } else {
        // Development convenience
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods([
                http::Method::GET,
                http::Method::POST,
                http::Method::PUT,
                http::Method::DELETE,
                http::Method::PATCH,
                http::Method::OPTIONS,
            ])
            .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
            .allow_credentials(true)
    };

    let app = Router::new()
        .merge(roamlog::presentation::http::pages::routes(ctx.clone()))
        .merge(roamlog::presentation::http::auth::routes(ctx.clone()))
        .merge(roamlog::presentation::http::account::routes(ctx.clone()))
        .merge(roamlog::presentation::http::posts::routes(ctx.clone()))
        .merge(roamlog::presentation::http::health::routes(pool.clone()))
        .nest_service("/static", ServeDir::new(&cfg.uploads_dir))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .fallback(roamlog::presentation::http::pages::not_found)
        .layer(cors)
        // Global body size limit for uploads (configurable)
        .layer(DefaultBodyLimit::max(cfg.upload_max_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                let matched = req
                    .extensions()
                    .get::<MatchedPath>()
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                tracing::info_span!("http", %method, %uri, matched_path = %matched)
            }),
        );

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
