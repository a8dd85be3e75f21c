use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use salary_core::ServiceError;

use super::{parse_input, AppState, JsonBody};
use crate::model::SalaryRecord;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/salary", get(list_records).post(create_record))
        .route(
            "/salary/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
}

// ---------------------------------------------------------------------------
// POST /salary
// ---------------------------------------------------------------------------

async fn create_record(
    State(svc): State<AppState>,
    payload: JsonBody,
) -> Result<(StatusCode, Json<SalaryRecord>), ServiceError> {
    let input = parse_input(payload)?;
    let record = svc.create(&input)?;
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// GET /salary
// ---------------------------------------------------------------------------

async fn list_records(
    State(svc): State<AppState>,
) -> Result<Json<Vec<SalaryRecord>>, ServiceError> {
    Ok(Json(svc.list()?))
}

// ---------------------------------------------------------------------------
// GET /salary/:id
// ---------------------------------------------------------------------------

async fn get_record(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SalaryRecord>, ServiceError> {
    Ok(Json(svc.get(id)?))
}

// ---------------------------------------------------------------------------
// PUT /salary/:id
// ---------------------------------------------------------------------------

async fn update_record(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
    payload: JsonBody,
) -> Result<Json<SalaryRecord>, ServiceError> {
    // Unknown ids are 404 whatever the body holds.
    let current = svc.get(id)?;
    let input = parse_input(payload)?;
    Ok(Json(svc.recompute(&current, &input)?))
}

// ---------------------------------------------------------------------------
// DELETE /salary/:id
// ---------------------------------------------------------------------------

async fn delete_record(
    State(svc): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete(id)?;
    Ok(Json(serde_json::json!({ "message": "Record deleted successfully" })))
}
