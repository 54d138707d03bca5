use crate::error::{ApiError, MessageResponse};
use crate::models::{
    decode_translations, encode_translations, merge_translations, AddRequest, Registration,
};
use crate::routes;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::Value as JsonValue;

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// POST /add handler - Register translations for an abbreviation
///
/// Merges into an existing record when the abbreviation is already known.
/// The read and the write are two separate store calls, so two concurrent
/// registrations of one key can race and the later write wins.
#[utoipa::path(
    post,
    path = routes::ADD,
    request_body = AddRequest,
    params(
        ("x-api-key" = String, Header, description = "Shared secret")
    ),
    responses(
        (status = 200, description = "Existing record merged", body = MessageResponse),
        (status = 201, description = "New record stored", body = MessageResponse),
        (status = 400, description = "Key invalid or too long, or value not a list of strings", body = MessageResponse),
        (status = 401, description = "Missing or wrong API key", body = MessageResponse),
        (status = 405, description = "Method other than POST", body = MessageResponse),
        (status = 500, description = "Malformed body or store error", body = MessageResponse)
    ),
    tag = "translations"
)]
pub async fn add_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    authorize(&headers, &state.config.api_key)?;

    let body: JsonValue = serde_json::from_slice(&body)?;
    let Registration { key, translations } = AddRequest::from_body(&body).into_registration()?;

    match state.store.get(&key).await? {
        Some(raw) => {
            let existing = decode_translations(&raw)?;
            let merged = merge_translations(existing, translations);
            state.store.put(&key, &encode_translations(&merged)?).await?;

            tracing::info!("Updated {} ({} translations)", key, merged.len());
            Ok((StatusCode::OK, Json(MessageResponse::new("updated successfully"))))
        }
        None => {
            state
                .store
                .put(&key, &encode_translations(&translations)?)
                .await?;

            tracing::info!("Stored {} ({} translations)", key, translations.len());
            Ok((StatusCode::CREATED, Json(MessageResponse::new("stored successfully"))))
        }
    }
}

fn authorize(headers: &HeaderMap, api_key: &str) -> Result<(), ApiError> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided == Some(api_key) {
        Ok(())
    } else {
        tracing::warn!(
            "Rejected registration: {}",
            if provided.is_some() { "wrong API key" } else { "missing API key" }
        );
        Err(ApiError::InvalidApiKey)
    }
}
