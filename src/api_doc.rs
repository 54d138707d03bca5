use utoipa::OpenApi;

use crate::error::MessageResponse;
use crate::handlers;
use crate::models::{AddRequest, GuessEntry, GuessRequest};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "abbrev-kv API",
        version = "0.1.0",
        description = "Register and look up translations of abbreviations"
    ),
    paths(
        handlers::guess::guess_handler,
        handlers::add::add_handler
    ),
    components(
        schemas(
            GuessRequest,
            GuessEntry,
            AddRequest,
            MessageResponse
        )
    ),
    tags(
        (name = "translations", description = "Abbreviation lookup and registration")
    )
)]
pub struct ApiDoc;
