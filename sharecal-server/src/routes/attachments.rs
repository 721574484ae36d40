//! Attachment downloads

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/attachments/{*path}", get(download))
}

/// GET /attachments/*path - Serve a stored attachment
async fn download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bytes = state.store.attachments().read(&path)?;
    Ok(([(header::CONTENT_TYPE, content_type(&path))], bytes))
}

fn content_type(path: &str) -> &'static str {
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "txt" => "text/plain; charset=utf-8",
        "ics" => "text/calendar; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    use crate::routes::test_support::TestApp;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("abc/Flyer.PNG"), "image/png");
        assert_eq!(content_type("abc/notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_missing_attachment_is_not_found() {
        let app = TestApp::new().await;

        let (status, _) = app
            .request("GET", "/attachments/nope/missing.pdf", None, Body::empty())
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
