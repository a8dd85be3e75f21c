mod predict;
mod salary;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router};

use salary_core::ServiceError;

use crate::model::SalaryInput;
use crate::service::SalaryService;

/// Shared handler state.
pub type AppState = Arc<SalaryService>;

/// Request body; rejections are turned into validation errors by [`parse_input`].
type JsonBody = Result<Json<SalaryInput>, JsonRejection>;

/// Build the salary module router.
///
/// Routes:
/// - `POST   /salary`: predict and store
/// - `GET    /salary`: list records
/// - `GET    /salary/{id}`: get record
/// - `PUT    /salary/{id}`: replace features, recompute prediction
/// - `DELETE /salary/{id}`: delete record
/// - `POST   /predict`: predict only
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(salary::routes())
        .merge(predict::routes())
        .with_state(state)
}

/// Malformed JSON, a missing field and a non-integer value all become 400.
fn parse_input(payload: JsonBody) -> Result<SalaryInput, ServiceError> {
    payload
        .map(|Json(input)| input)
        .map_err(|e| ServiceError::Validation(e.body_text()))
}
