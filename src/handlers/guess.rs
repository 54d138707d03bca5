use crate::error::{ApiError, MessageResponse};
use crate::models::{decode_translations, normalize_key, GuessEntry, GuessRequest};
use crate::routes;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, Json};
use serde_json::Value as JsonValue;

/// POST /guess handler - Look up the translations of an abbreviation
///
/// The lookup is case-insensitive; the response echoes the abbreviation in
/// the case it was sent.
#[utoipa::path(
    post,
    path = routes::GUESS,
    request_body = GuessRequest,
    responses(
        (status = 200, description = "Translations found", body = Vec<GuessEntry>),
        (status = 400, description = "Missing or empty text field", body = MessageResponse),
        (status = 404, description = "Abbreviation not registered", body = MessageResponse),
        (status = 405, description = "Method other than POST", body = MessageResponse),
        (status = 500, description = "Malformed body or store error", body = MessageResponse)
    ),
    tag = "translations"
)]
pub async fn guess_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<GuessEntry>>, ApiError> {
    let body: JsonValue = serde_json::from_slice(&body)?;
    let request = GuessRequest::from_body(&body);
    let abbreviation = request.abbreviation()?;
    let key = normalize_key(abbreviation);

    let Some(raw) = state.store.get(&key).await? else {
        tracing::debug!("No translations for: {}", key);
        return Err(ApiError::NotFound);
    };

    let trans = decode_translations(&raw)?;
    tracing::info!("Found {} translations for: {}", trans.len(), key);

    Ok(Json(vec![GuessEntry {
        name: abbreviation.to_string(),
        trans,
    }]))
}
