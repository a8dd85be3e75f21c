use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use salary_core::ServiceError;

use super::{parse_input, AppState, JsonBody};
use crate::model::Prediction;

pub fn routes() -> Router<AppState> {
    Router::new().route("/predict", post(predict))
}

/// POST /predict: run the pipeline without storing anything.
async fn predict(
    State(svc): State<AppState>,
    payload: JsonBody,
) -> Result<Json<Prediction>, ServiceError> {
    let input = parse_input(payload)?;
    Ok(Json(svc.predict(&input)?))
}
