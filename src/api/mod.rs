use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::{Router, routing::post};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::chat::ChatClient;
use crate::config::{Config, Credential};
use crate::error::AppError;
use crate::image_resolver::ImageResolver;
use crate::wiki::WikiClient;

pub mod handlers;
pub mod models;

/// Shared, read-only per-process state. Nothing here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatClient>,
    pub images: Arc<ImageResolver>,
    pub credential: Credential,
}

impl AppState {
    pub fn new(chat: ChatClient, images: ImageResolver, credential: Credential) -> Self {
        Self {
            chat: Arc::new(chat),
            images: Arc::new(images),
            credential,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let chat = ChatClient::new(
            &config.openai_base_url,
            config.openai_model.clone(),
            config.openai_temperature,
            config.openai_timeout,
        )?;
        let wiki = WikiClient::new(&config.wiki_base_url, config.wiki_timeout, &config.user_agent)?;
        Ok(Self::new(
            chat,
            ImageResolver::new(wiki),
            Credential::from_env_var(),
        ))
    }
}

/// API routes only, without static files or outer layers.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/generate",
            post(handlers::generate_handler).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
}

pub fn create_router(state: AppState, static_dir: &str) -> Router {
    // Static file serving for the form page
    with_layers(api_router(state).fallback_service(ServeDir::new(static_dir)))
}

/// CORS, request tracing and the panic boundary.
fn with_layers(router: Router) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("handler panicked: {detail}");
    AppError::Internal.into_response()
}
