//! Event endpoints

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::Utc;
use serde::Deserialize;

use sharecal_core::access::{can_assign_level, can_create, can_delete, can_edit, can_view};
use sharecal_core::{Event, EventId, SharecalError, Viewer};

use crate::routes::{AppError, EventView, MonthQuery, forbidden};
use crate::state::AppState;
use crate::viewer::CurrentViewer;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/events/{id}/attachment", put(upload_attachment))
}

/// GET /events?year&month - Events overlapping a month that the viewer may see
async fn list_events(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<EventView>>, AppError> {
    let month = query.month()?;

    let events: Vec<EventView> = state
        .store
        .events_in(&month.query_range(&Utc))?
        .into_iter()
        .filter(|event| can_view(&viewer, event))
        .map(|event| EventView::new(event, &viewer, &state))
        .collect();

    Ok(Json(events))
}

/// GET /events/:id
async fn get_event(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> Result<Json<EventView>, AppError> {
    let event = visible_event(&state, &viewer, &id)?;
    Ok(Json(EventView::new(event, &viewer, &state)))
}

/// POST /events - Create an event owned by the viewer
async fn create_event(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Json(mut event): Json<Event>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    if !can_create(&viewer) {
        return Err(forbidden("Sign in to add events"));
    }
    if !can_assign_level(&viewer, event.access_level) {
        return Err(forbidden("Only admins may create admin events"));
    }

    event.id = None;
    event.created_by = viewer.identity.clone();
    // Attachments are added through the upload endpoint.
    event.attachment = None;

    let created = state.store.create(event)?;
    Ok((StatusCode::CREATED, Json(EventView::new(created, &viewer, &state))))
}

/// PUT /events/:id - Replace an event
async fn update_event(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
    Json(mut event): Json<Event>,
) -> Result<Json<EventView>, AppError> {
    let existing = visible_event(&state, &viewer, &id)?;

    if !can_edit(&viewer, &existing, state.config.edit_policy) {
        return Err(forbidden(format!("{} may not edit '{}'", viewer, existing.name)));
    }
    if !can_assign_level(&viewer, event.access_level) {
        return Err(forbidden("Only admins may assign the admin access level"));
    }

    let kept_path = existing.attachment.as_ref().map(|a| a.path.as_str());
    if let Some(ref attachment) = event.attachment {
        if Some(attachment.path.as_str()) != kept_path {
            return Err(SharecalError::InvalidInput(
                "Attachments can only be replaced by uploading a file".into(),
            )
            .into());
        }
    }

    event.id = existing.id;
    event.created_by = existing.created_by;

    let updated = state.store.update(event)?;
    Ok(Json(EventView::new(updated, &viewer, &state)))
}

/// DELETE /events/:id
async fn delete_event(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let existing = visible_event(&state, &viewer, &id)?;

    if !can_delete(&viewer) {
        return Err(forbidden("Only admins may delete events"));
    }

    if let Some(id) = existing.id {
        state.store.delete(id)?;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct UploadQuery {
    filename: String,
}

/// PUT /events/:id/attachment?filename= - Attach the raw request body
async fn upload_attachment(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id): Path<String>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<EventView>, AppError> {
    let event = visible_event(&state, &viewer, &id)?;

    if !can_edit(&viewer, &event, state.config.edit_policy) {
        return Err(forbidden(format!("{} may not edit '{}'", viewer, event.name)));
    }
    if body.is_empty() {
        return Err(SharecalError::InvalidInput("Attachment is empty".into()).into());
    }

    let updated = state.store.attach(event, &query.filename, &body)?;
    Ok(Json(EventView::new(updated, &viewer, &state)))
}

/// Look up an event, answering 404 both when it is missing and when the
/// viewer may not see it.
fn visible_event(state: &AppState, viewer: &Viewer, id: &str) -> Result<Event, AppError> {
    let id: EventId = id.parse()?;
    let event = state.store.get(id)?;

    if !can_view(viewer, &event) {
        return Err(SharecalError::EventNotFound(id.to_string()).into());
    }
    Ok(event)
}
