//! Academy website backend
//!
//! REST backend for the trading academy's marketing site: public course
//! listings, page copy and the contact form, plus a session-guarded admin API.
//! The [`client`] module is the admin panel's data layer over that API.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::AdminAuthStore;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub auth: Arc<AdminAuthStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Open the database, make sure the admin account exists and seed content.
    pub async fn initialize(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let pool = db::init_database(&config.db_path).await?;
        let repo = Arc::new(Repository::new(pool.clone()));
        let auth = Arc::new(AdminAuthStore::new(
            pool,
            config.admin_username.clone(),
            config.session_ttl_secs,
        )?);

        if auth.ensure_admin(&config.admin_initial_password).await? {
            tracing::info!(username = %config.admin_username, "Created admin account");
            if config.admin_initial_password == "admin123" {
                tracing::warn!("Admin account uses the default password; change it after first login");
            }
        }

        if config.seed_catalogue {
            let seeded = db::seed_catalogue(&repo).await?;
            if seeded > 0 {
                tracing::info!("Seeded {} catalogue courses", seeded);
            }
        }

        Ok(Self {
            repo,
            auth,
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Session-guarded admin routes
    let admin_routes = Router::new()
        .route("/logout", post(api::logout))
        .route("/session", get(api::current_session))
        .route("/password", put(api::change_password))
        .route("/overview", get(api::overview))
        // Courses
        .route("/courses", get(api::list_courses).post(api::create_course))
        .route(
            "/courses/{id}",
            get(api::get_course)
                .put(api::update_course)
                .delete(api::delete_course),
        )
        // Contact submissions
        .route("/contact-submissions", get(api::list_submissions))
        .route(
            "/contact-submissions/{id}",
            put(api::update_submission).delete(api::delete_submission),
        )
        // Page copy
        .route("/pages/{slug}", put(api::update_page))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_guard,
        ));

    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        .route("/courses", get(api::list_public_courses))
        .route("/contact", post(api::submit_contact))
        .route("/pages", get(api::list_pages))
        .route("/pages/{slug}", get(api::get_page))
        .route("/admin/login", post(api::login))
        .nest("/admin", admin_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
