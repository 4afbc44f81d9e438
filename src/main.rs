#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
mod command;
mod config;
mod executor;
mod reply;
mod structures;

use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    command::UsageError,
    config::{Config, ConfigError, LogFormat},
    structures::{Event, QuickReply, StatusResponse},
};

#[macro_use]
extern crate tracing;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    start_tracing(config.log_format)?;
    let socket_address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(Arc::new(config));
    let tcp = TcpListener::bind(socket_address).await?;
    info!(%socket_address, "listening");
    axum::serve(tcp, app)
        .with_graceful_shutdown(vss::shutdown_signal())
        .await?;
    Ok(())
}

fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", post(handle_event))
        .route("/healthz", get(healthz))
        .route("/api/:address", get(handle_probe))
        .route("/api/java/:address", get(handle_java_ping))
        .route("/api/bedrock/:address", get(handle_bedrock_ping))
        .layer(axum::middleware::from_fn(no_store))
        .layer(TraceLayer::new_for_http())
        .with_state(config)
}

static CACHE_CONTROL_NO_STORE: HeaderValue = HeaderValue::from_static("no-store");

async fn no_store(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    resp.headers_mut()
        .insert(CACHE_CONTROL, CACHE_CONTROL_NO_STORE.clone());
    resp
}

#[allow(clippy::unused_async)]
async fn healthz() -> &'static str {
    "ok"
}

/// Answers the chat command with a quick reply; anything else gets no reply.
async fn handle_event(
    State(config): State<Arc<Config>>,
    axum::Json(event): axum::Json<Event>,
) -> Response {
    if event.post_type != "message" {
        return StatusCode::NO_CONTENT.into_response();
    }
    let Some(parsed) = command::parse_command(&config.command_prefix, &event.raw_message) else {
        return StatusCode::NO_CONTENT.into_response();
    };
    let reply = match parsed {
        Ok(target) => {
            match mcquery::tokio::probe(&target.host, target.port, config.query_timeout).await {
                Ok(status) => reply::status(&status),
                Err(error) => {
                    warn!(%target, %error, "server query failed");
                    reply::failure(&target)
                }
            }
        }
        Err(error) => {
            debug!(%error, raw_message = %event.raw_message, "bad command arguments");
            reply::usage(&config.command_prefix)
        }
    };
    Json(QuickReply::new(reply)).into_response()
}

async fn handle_probe(
    State(config): State<Arc<Config>>,
    Path(address): Path<String>,
) -> Result<Json<StatusResponse>, Failure> {
    let target = command::parse_address(&address, None)?;
    executor::probe(&target, config.query_timeout).await.map(Json)
}

async fn handle_java_ping(
    State(config): State<Arc<Config>>,
    Path(address): Path<String>,
) -> Result<Json<StatusResponse>, Failure> {
    let target = command::parse_address(&address, Some(mcquery::JAVA_PORT))?;
    executor::ping_java(&target, config.query_timeout).await.map(Json)
}

async fn handle_bedrock_ping(
    State(config): State<Arc<Config>>,
    Path(address): Path<String>,
) -> Result<Json<StatusResponse>, Failure> {
    let target = command::parse_address(&address, Some(mcquery::BEDROCK_PORT))?;
    executor::ping_bedrock(&target, config.query_timeout)
        .await
        .map(Json)
}

#[derive(thiserror::Error, Debug)]
pub enum Failure {
    #[error("Error connecting to the server: {0}")]
    ConnectionFailed(#[from] mcquery::Error),
    #[error("No server answered: {0}")]
    Unreachable(#[from] mcquery::tokio::ProbeError),
    #[error("Invalid address: {0}")]
    BadAddress(#[from] UsageError),
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let status = match self {
            Self::ConnectionFailed(_) | Self::Unreachable(_) => StatusCode::OK,
            Self::BadAddress(_) => StatusCode::BAD_REQUEST,
        };
        warn!(error = ?self, "Error processing request");
        let ser = ErrorSerialization {
            error: self.to_string(),
        };
        (status, Json(ser)).into_response()
    }
}

#[derive(serde::Serialize)]
pub struct ErrorSerialization {
    error: String,
}

pub struct Json<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        static JSON_CTYPE: HeaderValue = HeaderValue::from_static("application/json;charset=utf-8");

        let body = serde_json::to_vec_pretty(&self.0).unwrap_or_else(|_| {
            r#"{"error": "JSON Serialization failed, please make a bug report"}"#
                .as_bytes()
                .to_vec()
        });
        ([(CONTENT_TYPE, JSON_CTYPE.clone())], body).into_response()
    }
}

#[derive(thiserror::Error, Debug)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid default log directive: {0}")]
    Directive(#[from] tracing_subscriber::filter::ParseError),
    #[error("invalid LOG filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::FromEnvError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn start_tracing(format: LogFormat) -> Result<(), StartupError> {
    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(concat!(env!("CARGO_PKG_NAME"), "=info").parse()?)
        .with_env_var("LOG")
        .from_env()?;
    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(env_filter)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        router(Arc::new(Config::default()))
    }

    async fn post_event(body: &'static str) -> Response {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        app().oneshot(request).await.unwrap()
    }

    async fn get_uri(uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = get_uri("/healthz").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CACHE_CONTROL], "no-store");
    }

    #[tokio::test]
    async fn test_ignores_other_events() {
        let response = post_event(r#"{"post_type":"notice"}"#).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = post_event(r#"{"post_type":"message","raw_message":"hello"}"#).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_usage_reply() {
        let response = post_event(r#"{"post_type":"message","raw_message":"/mcinfo"}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["reply"],
            "Invalid arguments, did you mean:\n/mcinfo <host> <port>"
        );
        assert_eq!(body["auto_escape"], true);
    }

    #[tokio::test]
    async fn test_probe_requires_port() {
        let response = get_uri("/api/example.org").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid address: no port given");
    }

    #[tokio::test]
    async fn test_refused_query_reports_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let response = get_uri(&format!("/api/java/127.0.0.1:{port}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["error"],
            "Error connecting to the server: the server refused the connection"
        );
    }
}
