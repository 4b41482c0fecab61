//! Event receiver server.
//!
//! # Responsibilities
//! - Create Axum Router with the event handlers
//! - Wire up middleware (tracing, request ID, timeout) and the body limit
//! - Decode inbound events through the [`Event`] extractor
//! - Echo events back in the mode they arrived in, or acknowledge with 202
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::http::binding::HttpBinding;
use crate::http::extract::Event;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub binding: Arc<HttpBinding>,
    pub echo: bool,
}

impl FromRef<AppState> for Arc<HttpBinding> {
    fn from_ref(state: &AppState) -> Self {
        state.binding.clone()
    }
}

/// HTTP server that receives events.
pub struct EventServer {
    router: Router,
    config: ServerConfig,
}

impl EventServer {
    pub fn new(config: ServerConfig, binding: Arc<HttpBinding>) -> Self {
        let state = AppState {
            binding,
            echo: config.echo,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let body_limit = state.binding.max_body_size();

        Router::new()
            .route("/", post(receive_event))
            .route("/events", post(receive_event))
            .with_state(state)
            .layer(DefaultBodyLimit::max(body_limit))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.request_timeout_secs),
                    )),
            )
    }

    /// The router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, echo = self.config.echo, "Event server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Event server stopped");
        Ok(())
    }
}

async fn receive_event(State(state): State<AppState>, event: Event) -> Response {
    let Event { envelope, mode } = event;
    tracing::info!(
        id = %envelope.id(),
        source = %envelope.source(),
        event_type = %envelope.event_type(),
        mode = %mode,
        extensions = envelope.extensions().len(),
        "Event received"
    );

    if !state.echo {
        return StatusCode::ACCEPTED.into_response();
    }

    match state.binding.response(&envelope, mode, StatusCode::OK) {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(id = %envelope.id(), error = %e, "Failed to encode reply");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BindingConfig;
    use crate::event::Envelope;
    use crate::http::binding::Mode;
    use axum::body::Body;
    use axum::http::{Request, Uri};
    use tower::ServiceExt;

    fn server(echo: bool) -> (EventServer, Arc<HttpBinding>) {
        let binding = Arc::new(HttpBinding::from_config(&BindingConfig::default()).unwrap());
        let config = ServerConfig {
            echo,
            ..ServerConfig::default()
        };
        (EventServer::new(config, binding.clone()), binding)
    }

    fn event() -> Envelope {
        Envelope::builder()
            .id("e-1")
            .source("/tests")
            .event_type("com.example.ping")
            .content_type("application/json")
            .data(serde_json::json!({"ping": true}))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_echo_same_mode() {
        let (server, binding) = server(true);
        let request = binding
            .request(&event(), Mode::Structured, Uri::from_static("/events"))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/cloudevents+json"
        );

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        let (echoed, mode) = binding.decode_http(&parts.headers, body).unwrap();
        assert_eq!(mode, Mode::Structured);
        assert_eq!(echoed, event());
    }

    #[tokio::test]
    async fn test_accepts_without_echo() {
        let (server, binding) = server(false);
        let request = binding
            .request(&event(), Mode::Binary, Uri::from_static("/"))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let binding = Arc::new(
            HttpBinding::from_config(&BindingConfig {
                max_body_size: 16,
                ..BindingConfig::default()
            })
            .unwrap(),
        );
        let server = EventServer::new(ServerConfig::default(), binding.clone());
        let request = binding
            .request(&event(), Mode::Structured, Uri::from_static("/"))
            .unwrap();

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_get_not_allowed() {
        let (server, _) = server(true);
        let request = Request::builder().uri("/events").body(Body::empty()).unwrap();

        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
