use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::state::AppState;

use super::dto::{CreateMealRequest, DeleteConfirm, MealResponse, SummaryResponse};

// --- public routers ---

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/summary", get(meal_summary))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(create_meal))
        .route("/meals/:id", delete(delete_meal))
}

// --- handlers ---

#[instrument(skip(state))]
pub async fn list_meals(State(state): State<AppState>) -> Json<Vec<MealResponse>> {
    let log = state.log.lock().await;
    let items = log.records().iter().cloned().map(MealResponse::from).collect();
    Json(items)
}

#[instrument(skip(state))]
pub async fn meal_summary(State(state): State<AppState>) -> Json<SummaryResponse> {
    let summary = state.log.lock().await.summary();
    Json(SummaryResponse {
        count: summary.count,
        total_calories: summary.total_calories,
    })
}

#[instrument(skip(state, body))]
pub async fn create_meal(
    State(state): State<AppState>,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<MealResponse>), (StatusCode, String)> {
    let mut log = state.log.lock().await;
    let record = log
        .add_meal(body.name, body.description, body.category, body.calories)
        .map_err(|e| {
            warn!(field = e.field, "meal rejected");
            (StatusCode::BAD_REQUEST, e.to_string())
        })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/meals/{}", record.id)
            .parse()
            .map_err(internal)?,
    );

    info!(id = record.id, "meal added");
    Ok((StatusCode::CREATED, headers, Json(record.into())))
}

/// DELETE /meals/:id?confirm=true — without the confirmation flag the request
/// is bounced back so the client can prompt the user first.
#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<DeleteConfirm>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !q.confirm {
        return Err((
            StatusCode::CONFLICT,
            "confirmation required: resend with confirm=true".into(),
        ));
    }

    let removed = state.log.lock().await.delete_meal(id);
    if removed {
        info!(id, "meal deleted");
    } else {
        info!(id, "delete ignored, no such meal");
    }
    Ok(StatusCode::NO_CONTENT)
}

fn internal<E: std::error::Error>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
