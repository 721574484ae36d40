//! Per-request viewer resolution.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use sharecal_core::Viewer;

use crate::state::AppState;

/// Header carrying the id of the user making the request.
pub const USER_HEADER: &str = "x-sharecal-user";

/// The viewer behind a request, with the role currently on disk. A missing
/// header means anonymous; an id the user directory does not know yields a
/// viewer without a role.
pub struct CurrentViewer(pub Viewer);

impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(identity) = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
        else {
            return Ok(CurrentViewer(Viewer::anonymous()));
        };

        // Roles may have changed on disk since the last request.
        let mut users = state.users.write().await;
        if let Err(e) = users.reload() {
            tracing::warn!(error = %e, "Could not reload users");
        }
        Ok(CurrentViewer(users.viewer_for(Some(identity))))
    }
}
