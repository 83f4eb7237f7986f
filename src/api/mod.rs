use crate::APP_USER_AGENT;
use anyhow::{Context, Result, anyhow};
use axum::{
    Extension, Json, Router,
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Method, Request, header::CONTENT_TYPE},
    routing::{get, options, post},
};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{Span, error, info, info_span};
use ulid::Ulid;
use url::Url;

pub mod config;
pub mod error;
pub(crate) mod handlers;
// OpenAPI router wiring and route registration live in openapi.rs.
mod openapi;
pub mod pagination;
pub mod validation;

pub use openapi::openapi;

use config::ApiConfig;
use handlers::{athletes, categories, health, training_centers};

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub min_connections: u32,
    pub max_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 5,
        }
    }
}

/// Build the application router around `pool`.
///
/// Documented routes come from the `OpenAPI` router; `OPTIONS /health`,
/// `/openapi.json` and the trailing-slash collection paths (`/categorias/`, ...)
/// are added here.
///
/// # Errors
/// Returns an error if the configured CORS origin is not a valid URL.
pub fn app(pool: PgPool, config: ApiConfig) -> Result<Router> {
    let cors = config.cors_origin().map(cors_layer).transpose()?;

    let (router, openapi) = openapi::api_router().split_for_parts();
    let openapi = Arc::new(openapi);

    let router = with_trailing_slash_collections(router)
        .route("/health", options(health::health))
        .route(
            "/openapi.json",
            get(move || {
                let openapi = Arc::clone(&openapi);
                async move { Json(openapi.as_ref().clone()) }
            }),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(Arc::new(config)))
                .layer(Extension(pool)),
        );

    Ok(match cors {
        Some(cors) => router.layer(cors),
        None => router,
    })
}

/// Collections are also reachable as `/<resource>/`, the form older clients call.
fn with_trailing_slash_collections(router: Router) -> Router {
    router
        .route(
            "/categorias/",
            post(categories::handlers::create_category)
                .get(categories::handlers::list_categories),
        )
        .route(
            "/centros_treinamento/",
            post(training_centers::handlers::create_training_center)
                .get(training_centers::handlers::list_training_centers),
        )
        .route(
            "/atletas/",
            post(athletes::handlers::create_athlete).get(athletes::handlers::list_athletes),
        )
}

/// Start the server
/// # Errors
/// Return error if the database is unreachable or the port cannot be bound
pub async fn new(
    port: u16,
    dsn: &SecretString,
    pool_settings: PoolSettings,
    config: ApiConfig,
) -> Result<()> {
    let pool = PgPoolOptions::new()
        .min_connections(pool_settings.min_connections)
        .max_connections(pool_settings.max_connections)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn.expose_secret())
        .await
        .context("Failed to connect to database")?;

    let app = app(pool, config)?;

    let listener = TcpListener::bind(format!("::0:{port}"))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("{} listening on [::]:{}", APP_USER_AGENT, port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gracefully shutdown");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, starting shutdown"),
        () = terminate => info!("Received SIGTERM, starting shutdown"),
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_headers([CONTENT_TYPE])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_origin(AllowOrigin::exact(cors_origin(origin)?)))
}

/// Reduce a URL to its `scheme://host[:port]` origin.
fn cors_origin(value: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(value).with_context(|| format!("Invalid CORS origin: {value}"))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| anyhow!("CORS origin must include a valid host: {value}"))?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build CORS origin header")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::unreachable_pool;
    use axum::http::{StatusCode, header::ORIGIN};
    use tower::ServiceExt;

    #[test]
    fn cors_origin_strips_path() -> Result<()> {
        let origin = cors_origin("https://app.example.com:8443/some/path")?;
        assert_eq!(origin, "https://app.example.com:8443");
        Ok(())
    }

    #[test]
    fn cors_origin_rejects_garbage() {
        assert!(cors_origin("not a url").is_err());
    }

    #[tokio::test]
    async fn invalid_cors_origin_fails_app() {
        let config = ApiConfig::new().with_cors_origin(Some("nope".to_string()));
        assert!(app(unreachable_pool(), config).is_err());
    }

    #[tokio::test]
    async fn request_id_is_generated_and_propagated() -> Result<()> {
        let app = app(unreachable_pool(), ApiConfig::new())?;
        let response = app
            .oneshot(Request::get("/openapi.json").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(request_id.len(), 26);
        Ok(())
    }

    #[tokio::test]
    async fn request_id_from_client_is_kept() -> Result<()> {
        let app = app(unreachable_pool(), ApiConfig::new())?;
        let response = app
            .oneshot(
                Request::get("/openapi.json")
                    .header("x-request-id", "client-id")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
            Some("client-id")
        );
        Ok(())
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() -> Result<()> {
        let config =
            ApiConfig::new().with_cors_origin(Some("https://app.example.com".to_string()));
        let app = app(unreachable_pool(), config)?;
        let response = app
            .oneshot(
                Request::get("/openapi.json")
                    .header(ORIGIN, "https://app.example.com")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://app.example.com")
        );
        Ok(())
    }

    #[test]
    fn default_pool_settings() {
        let settings = PoolSettings::default();
        assert_eq!(settings.min_connections, 1);
        assert_eq!(settings.max_connections, 5);
    }
}
