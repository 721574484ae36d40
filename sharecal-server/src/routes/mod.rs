pub mod attachments;
pub mod calendar;
pub mod events;
pub mod grid;
pub mod users;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use sharecal_core::{
    ColorToken, Event, Month, Permissions, SharecalError, Viewer, access::color_for_access_level,
};

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(events::router())
        .merge(grid::router())
        .merge(calendar::router())
        .merge(attachments::router())
        .merge(users::router())
        .with_state(state)
        .layer(cors)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses, picking the status from the
/// underlying `SharecalError` when there is one
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<SharecalError>() {
            Some(SharecalError::EventNotFound(_))
            | Some(SharecalError::UserNotFound(_))
            | Some(SharecalError::Attachment(_)) => StatusCode::NOT_FOUND,
            Some(SharecalError::PermissionDenied(_)) => StatusCode::FORBIDDEN,
            Some(SharecalError::InvalidInput(_)) | Some(SharecalError::IcsParse(_)) => {
                StatusCode::BAD_REQUEST
            }
            Some(SharecalError::InvalidRange(_)) | Some(SharecalError::MissingId) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self.0, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Shorthand for a 403 with a message.
pub fn forbidden(message: impl Into<String>) -> AppError {
    SharecalError::PermissionDenied(message.into()).into()
}

/// `?year=2024&month=12`; either part defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl MonthQuery {
    pub fn month(&self) -> Result<Month, AppError> {
        let today = Utc::now().date_naive();
        let year = self.year.unwrap_or(today.year());
        let month = self.month.unwrap_or(today.month());

        Month::new(year, month).ok_or_else(|| {
            SharecalError::InvalidInput(format!("Invalid month {}-{}", year, month)).into()
        })
    }
}

/// An event as presented to one viewer.
#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub permissions: Permissions,
    pub color: ColorToken,
}

impl EventView {
    pub fn new(event: Event, viewer: &Viewer, state: &AppState) -> Self {
        let permissions = Permissions::evaluate(viewer, &event, state.config.edit_policy);
        let color = color_for_access_level(&event);
        EventView {
            event,
            permissions,
            color,
        }
    }
}
