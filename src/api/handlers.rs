use axum::extract::rejection::JsonRejection;
use axum::{Json, extract::State};

use crate::config::API_KEY_VAR;
use crate::error::AppError;

use super::AppState;
use super::models::{GenerateRequest, GenerateResponse};

#[tracing::instrument(skip_all)]
pub async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    // a body we cannot read is treated like one without a term
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("unreadable request body: {rejection}");
            return Err(AppError::MissingTerm);
        }
    };
    let term = request.term().ok_or(AppError::MissingTerm)?;

    let api_key = state
        .credential
        .resolve()
        .ok_or(AppError::MissingCredential(API_KEY_VAR))?;

    tracing::info!(term, "generating definition");

    let (text, image_url) = tokio::join!(
        state.chat.define(&api_key, term),
        state.images.resolve(term)
    );
    let text = text?;

    tracing::info!(term, has_image = !image_url.is_empty(), "definition ready");

    Ok(Json(GenerateResponse { text, image_url }))
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
