//! Yogdan: a blood donor directory served as server-rendered pages over a
//! hosted accounts and profiles backend.

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, HeaderValue, Request, StatusCode},
    middleware::{from_fn, Next},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod backend;
pub mod config;
pub mod directory;
pub mod error;
pub mod events;
pub mod forms;
pub mod locations;
pub mod profile;
pub mod render;
pub mod routes;

pub use error::{Error, Result};

use auth::SessionKeys;
use backend::Backend;
use profile::CertificateBook;
use render::Templates;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub templates: Arc<Templates>,
    pub sessions: SessionKeys,
    pub certificates: CertificateBook,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn Backend>,
        session_secret: &[u8],
        secure_cookies: bool,
    ) -> Result<Self> {
        Ok(Self {
            backend,
            templates: Arc::new(Templates::new()?),
            sessions: SessionKeys::new(session_secret, secure_cookies),
            certificates: CertificateBook::new(),
        })
    }
}

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
    script-src 'self' https://unpkg.com; \
    style-src 'self' 'unsafe-inline' https://unpkg.com; \
    img-src 'self' data: blob: https:; \
    worker-src blob:; \
    child-src blob:; \
    connect-src 'self' https://basemaps.cartocdn.com https://*.basemaps.cartocdn.com; \
    frame-ancestors 'none';";

/// Every route and the layers shared by all deployments. Rate limiting and
/// CORS are added by the server binary.
pub fn build_router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(routes::pages::home))
        .route("/about", get(routes::pages::about))
        .route("/health", get(routes::pages::health_check))
        .route("/events", get(routes::events::events_page))
        .route("/donors", get(routes::donors::donors_page))
        .route("/donors/{id}", get(routes::donors::contact_donor))
        .route("/signup", get(auth::signup_form).post(auth::signup))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(routes::profile::show_profile).post(routes::profile::update_profile),
        )
        .route("/profile/certificates", post(routes::profile::add_certificate))
        .route(
            "/profile/certificates/{id}/delete",
            post(routes::profile::delete_certificate),
        )
        // JSON API
        .route("/api/donors", get(routes::donors::api_donors))
        .route("/api/events", get(routes::events::api_events))
        .route("/api/locations", get(routes::pages::api_locations))
        .nest_service("/assets", ServeDir::new(static_dir))
        .fallback(routes::pages::not_found)
        .layer(from_fn(cache_control))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY),
        ))
        .with_state(state)
}

async fn cache_control(req: Request<Body>, next: Next) -> impl IntoResponse {
    let path = req.uri().path().to_string();
    let mut response = next.run(req).await;

    if response.status() != StatusCode::OK {
        return response;
    }

    // Pages carry per-user chrome and live donor data.
    let value = if path.starts_with("/assets/") {
        HeaderValue::from_static("public, max-age=3600")
    } else {
        HeaderValue::from_static("no-cache")
    };
    response.headers_mut().insert(header::CACHE_CONTROL, value);
    response
}
