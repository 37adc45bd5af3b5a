use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use auth::TokenManager;
use axum::body::Body;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::AllowHeaders;
use tower_http::cors::AllowMethods;
use tower_http::cors::AllowOrigin;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::me::me;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::ApiError;
use super::middleware::authenticate as auth_middleware;
use crate::config::CorsConfig;
use crate::domain::user::ports::AuthServicePort;

pub struct AppState<AS: AuthServicePort> {
    pub auth_service: Arc<AS>,
    pub token_manager: Arc<TokenManager>,
}

impl<AS: AuthServicePort> Clone for AppState<AS> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            token_manager: Arc::clone(&self.token_manager),
        }
    }
}

pub fn create_router<AS: AuthServicePort>(
    auth_service: Arc<AS>,
    token_manager: Arc<TokenManager>,
    cors: &CorsConfig,
) -> Router {
    let state = AppState {
        auth_service,
        token_manager,
    };

    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(register::<AS>))
        .route("/api/auth/login", post(login::<AS>))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/refresh", post(refresh::<AS>));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(me::<AS>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::<AS>,
        ));

    // Headers are left out of the span: Authorization carries credentials
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Applied innermost-first: CORS is outermost, then tracing, then panic catching
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(trace_layer)
        .layer(cors_layer(cors))
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::InternalServerError.into_response()
}

/// Build the CORS policy from configuration.
///
/// A `*` entry allows any value for that list. Entries that do not parse are
/// skipped with a warning.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_entries::<HeaderValue>(
            &config.allowed_origins,
            "origin",
        ))
    };

    let methods = if config.allowed_methods.iter().any(|m| m == "*") {
        AllowMethods::any()
    } else {
        AllowMethods::list(parse_entries::<Method>(&config.allowed_methods, "method"))
    };

    let headers = if config.allowed_headers.iter().any(|h| h == "*") {
        AllowHeaders::any()
    } else {
        AllowHeaders::list(parse_entries::<HeaderName>(
            &config.allowed_headers,
            "header",
        ))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
}

fn parse_entries<T>(entries: &[String], kind: &str) -> Vec<T>
where
    T: std::str::FromStr,
{
    entries
        .iter()
        .filter_map(|entry| match entry.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(kind, entry = %entry, "Ignoring invalid CORS entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_skips_invalid() {
        let methods = parse_entries::<Method>(
            &["GET".to_string(), "POST".to_string(), "NOT A METHOD".to_string()],
            "method",
        );
        assert_eq!(methods, vec![Method::GET, Method::POST]);

        let origins = parse_entries::<HeaderValue>(
            &["http://localhost:3000".to_string(), "bad\norigin".to_string()],
            "origin",
        );
        assert_eq!(origins, vec![HeaderValue::from_static("http://localhost:3000")]);
    }
}
