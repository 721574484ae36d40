//! iCalendar export and import

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::{get, post},
};

use sharecal_core::access::can_view;
use sharecal_core::ics::{export_calendar, parse_calendar};
use sharecal_core::store::ImportSummary;
use sharecal_core::Event;

use crate::routes::{AppError, forbidden};
use crate::state::AppState;
use crate::viewer::CurrentViewer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/export.ics", get(export))
        .route("/import", post(import))
}

/// GET /export.ics - Every event the signed-in viewer may see
async fn export(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
) -> Result<impl IntoResponse, AppError> {
    if !viewer.is_authenticated() {
        return Err(forbidden("Sign in to export the calendar"));
    }

    let events: Vec<Event> = state
        .store
        .events()?
        .into_iter()
        .filter(|event| can_view(&viewer, event))
        .collect();

    let attachments = state.store.attachments();
    let ics = export_calendar(&events, |a| Some(attachments.public_url(&a.path)))?;

    tracing::info!(viewer = %viewer, count = events.len(), "Exported calendar");

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sharecal.ics\"",
            ),
        ],
        ics,
    ))
}

/// POST /import - Import the VEVENTs of an ICS body
async fn import(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    body: String,
) -> Result<Json<ImportSummary>, AppError> {
    let events = parse_calendar(&body)?;
    let summary = state.store.import(events, &viewer, state.config.edit_policy)?;
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::StatusCode;

    use sharecal_core::AccessLevel;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_export_requires_sign_in() {
        let app = TestApp::new().await;

        let (status, _) = app.request("GET", "/export.ics", None, Body::empty()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_export_contains_visible_events() {
        let app = TestApp::new().await;
        app.seed("Open House", Some(AccessLevel::Edit), "alice");
        app.seed("Untagged", None, "alice");

        let (status, body) = app
            .request("GET", "/export.ics", Some("bob"), Body::empty())
            .await;
        let ics = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(ics.contains("PRODID:-//sharecal//EN"), "ICS:\n{}", ics);
        assert!(ics.contains("SUMMARY:Open House"), "ICS:\n{}", ics);
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
    }

    #[tokio::test]
    async fn test_import_creates_events() {
        let app = TestApp::new().await;
        let ics = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
BEGIN:VEVENT\r\n\
UID:elsewhere-1\r\n\
SUMMARY:Imported\r\n\
DTSTART:20240301T120000Z\r\n\
DTEND:20240301T130000Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

        let (status, _) = app.request("POST", "/import", None, Body::from(ics)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.request("POST", "/import", Some("bob"), Body::from(ics)).await;
        assert_eq!(status, StatusCode::OK);
        let summary: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(summary["created"], 1);

        let events = app.state.store.events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].created_by.as_deref(), Some("bob"));
    }
}
