use rocket::http::uri::Origin;
use rocket::http::Status;
use rocket::Request;

use rocket_db_pools::sqlx;

use rocket_dyn_templates::{context, Template};

// Go to panel message.
const GO_TO_PANEL_MESSAGE: &str = "Go to panel";
// Route of the default panel.
const PANEL_ROUTE: &str = "/";
// Unknown error.
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown";

/// Failures of climate unit operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ClimateError {
    #[error("Climate unit {0} not found")]
    NotFound(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Climate unit {id} has a corrupted record: {reason}")]
    Corrupted { id: i64, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct RenderTemplate;

impl RenderTemplate {
    fn text(uri: &Origin<'_>, status: u16, error_message: &str) -> Template {
        Template::render(
            "error",
            context! {
                route: PANEL_ROUTE,
                uri: uri.to_string(),
                status,
                error_message,
                goto_message: GO_TO_PANEL_MESSAGE,
            },
        )
    }
}

#[derive(Responder)]
pub(crate) enum PanelError {
    #[response(status = 404, content_type = "html")]
    NotFound(Template),
    #[response(status = 400, content_type = "html")]
    InvalidArgument(Template),
    #[response(status = 500, content_type = "html")]
    Internal(Template),
}

impl PanelError {
    // Render the page associated with a climate unit error.
    pub(crate) fn new(uri: &Origin<'_>, error: ClimateError) -> Self {
        let message = error.to_string();
        match error {
            ClimateError::NotFound(_) => Self::NotFound(RenderTemplate::text(uri, 404, &message)),
            ClimateError::InvalidArgument(_) => {
                Self::InvalidArgument(RenderTemplate::text(uri, 400, &message))
            }
            ClimateError::Corrupted { .. } | ClimateError::Database(_) => {
                tracing::error!(%uri, "{}", message);
                Self::Internal(RenderTemplate::text(uri, 500, &message))
            }
        }
    }
}

#[inline(always)]
pub(crate) async fn panel_error<T>(
    function: impl std::future::Future<Output = Result<T, ClimateError>>,
    uri: &Origin<'_>,
) -> Result<T, PanelError> {
    function.await.map_err(|e| PanelError::new(uri, e))
}

// Renders the template for any other kind of catchers
#[catch(default)]
pub(crate) fn default(status: Status, req: &Request<'_>) -> Template {
    RenderTemplate::text(
        req.uri(),
        status.code,
        status.reason().unwrap_or(UNKNOWN_ERROR_MESSAGE),
    )
}

// Returns all defined catchers
pub(crate) fn catchers() -> Vec<rocket::Catcher> {
    catchers![default]
}
