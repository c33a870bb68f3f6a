use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use platform_api::{ApiError, ApiResult};
use products_hr::{
    Compensation, CompensationInput, Employee, EmployeeInput, ReportingStructure, store,
};
use tracing::debug;
use uuid::Uuid;

use crate::http::AppState;

/// Path identifiers that are not UUIDs cannot name a stored employee.
fn parse_employee_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::invalid(rejection.body_text()))
}

pub async fn create_employee(
    State(state): State<AppState>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let input = body(payload)?;
    debug!("received employee create request");
    let employee = store::create_employee(&state.pool, input).await?;
    let location = format!("/api/employee/{}", employee.employee_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(employee),
    ))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let id = parse_employee_id(&id)?;
    debug!(%id, "received employee read request");
    store::find_employee(&state.pool, id, 1)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn replace_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeInput>, JsonRejection>,
) -> ApiResult<Json<Employee>> {
    let id = parse_employee_id(&id)?;
    let input = body(payload)?;
    if let Some(body_id) = input.employee_id.filter(|body_id| *body_id != id) {
        debug!(%id, %body_id, "ignoring employee id in request body");
    }
    debug!(%id, "received employee update request");
    let employee = store::replace_employee(&state.pool, id, input).await?;
    Ok(Json(employee))
}

pub async fn get_reporting_structure(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ReportingStructure>> {
    let id = parse_employee_id(&id)?;
    debug!(%id, "received reporting structure request");
    store::reporting_structure(&state.pool, id, state.config.reporting_max_depth)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn create_compensation(
    State(state): State<AppState>,
    payload: Result<Json<CompensationInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let input = body(payload)?;
    debug!("received compensation create request");
    let compensation = store::create_compensation(&state.pool, input).await?;
    let location = format!("/api/compensation/{}", compensation.employee.employee_id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(compensation),
    ))
}

pub async fn get_compensation(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<Compensation>> {
    let employee_id = parse_employee_id(&employee_id)?;
    debug!(%employee_id, "received compensation read request");
    store::find_compensation(&state.pool, employee_id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}
