//! Month grid endpoint

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use sharecal_core::access::can_view;
use sharecal_core::{Event, Month, MonthGrid, SharecalError};

use crate::routes::{AppError, EventView, MonthQuery};
use crate::state::AppState;
use crate::viewer::CurrentViewer;

pub fn router() -> Router<AppState> {
    Router::new().route("/grid", get(month_grid))
}

#[derive(Debug, Deserialize)]
struct GridQuery {
    year: Option<i32>,
    month: Option<u32>,
    /// IANA zone deciding which days events fall on. Defaults to UTC.
    tz: Option<String>,
}

#[derive(Serialize)]
pub struct GridView {
    pub month: Month,
    pub title: String,
    pub cells: Vec<CellView>,
}

#[derive(Serialize)]
pub struct CellView {
    pub date: NaiveDate,
    pub in_current_month: bool,
    pub is_today: bool,
    pub events: Vec<EventView>,
    /// Events left out by the per-cell cap.
    pub more: usize,
}

/// GET /grid?year&month&tz - The month grid of events the viewer may see
async fn month_grid(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridView>, AppError> {
    let month = MonthQuery {
        year: query.year,
        month: query.month,
    }
    .month()?;
    let tz: chrono_tz::Tz = match query.tz.as_deref() {
        None => chrono_tz::UTC,
        Some(name) => name
            .parse()
            .map_err(|_| SharecalError::InvalidInput(format!("Unknown time zone '{}'", name)))?,
    };

    let events: Vec<Event> = state
        .store
        .events_in(&month.query_range(&tz))?
        .into_iter()
        .filter(|event| can_view(&viewer, event))
        .collect();

    let today = Utc::now().with_timezone(&tz).date_naive();
    let grid = MonthGrid::build(month, &events, today, &tz);
    let cap = state.config.cell_cap();

    let cells = grid
        .cells
        .iter()
        .map(|cell| {
            let preview = cell.preview(cap);
            CellView {
                date: cell.date,
                in_current_month: cell.in_current_month,
                is_today: cell.is_today,
                events: preview
                    .shown
                    .iter()
                    .map(|event| EventView::new((*event).clone(), &viewer, &state))
                    .collect(),
                more: preview.hidden,
            }
        })
        .collect();

    Ok(Json(GridView {
        month,
        title: month.to_string(),
        cells,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use sharecal_core::AccessLevel;

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_grid_for_december_2024() {
        let app = TestApp::new().await;
        app.seed("Open House", Some(AccessLevel::Edit), "alice");

        let (status, body) = app.json("GET", "/grid?year=2024&month=12", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "December 2024");

        let cells = body["cells"].as_array().unwrap();
        assert_eq!(cells.len() % 7, 0);
        assert_eq!(cells[0]["date"], "2024-12-01");

        let with_event: Vec<&str> = cells
            .iter()
            .filter(|c| !c["events"].as_array().unwrap().is_empty())
            .map(|c| c["date"].as_str().unwrap())
            .collect();
        assert_eq!(with_event, vec!["2024-12-24", "2024-12-25", "2024-12-26"]);
    }

    #[tokio::test]
    async fn test_grid_caps_cells() {
        let app = TestApp::new().await;
        for name in ["One", "Two", "Three"] {
            app.seed(name, Some(AccessLevel::ReadOnly), "alice");
        }

        let (_, body) = app
            .json("GET", "/grid?year=2024&month=12", Some("bob"), None)
            .await;
        let christmas = body["cells"]
            .as_array()
            .unwrap()
            .iter()
            .find(|c| c["date"] == "2024-12-25")
            .unwrap()
            .clone();

        assert_eq!(christmas["events"].as_array().unwrap().len(), 2);
        assert_eq!(christmas["more"], 1);
    }

    #[tokio::test]
    async fn test_grid_rejects_bad_input() {
        let app = TestApp::new().await;

        let (status, _) = app.json("GET", "/grid?year=2024&month=13", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .json("GET", "/grid?year=2024&month=1&tz=Mars/Olympus", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
