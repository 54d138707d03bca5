use axum::{middleware, routing::post, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::cors;
use crate::handlers::{self, fallback};
use crate::state::AppState;

// Route path constants - single source of truth for all API paths
pub const GUESS: &str = "/guess";
pub const ADD: &str = "/add";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Build the full application router
///
/// CORS and request tracing wrap every route as well as the fallbacks, so
/// a 404 or 405 carries the same headers as a success.
pub fn build_router(state: AppState) -> Router {
    let serve_api_docs = state.config.serve_api_docs;

    let mut router = Router::new()
        .route(
            GUESS,
            post(handlers::guess_handler).fallback(fallback::guess_method_not_allowed),
        )
        .route(
            ADD,
            post(handlers::add_handler).fallback(fallback::add_method_not_allowed),
        )
        .fallback(fallback::not_found)
        .with_state(state);

    if serve_api_docs {
        router = router.merge(SwaggerUi::new(SWAGGER_UI).url(OPENAPI_JSON, ApiDoc::openapi()));
    }

    router
        .layer(middleware::from_fn(cors::cors))
        .layer(TraceLayer::new_for_http())
}
