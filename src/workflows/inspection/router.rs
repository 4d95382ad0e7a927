use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::catalog::{ConditionRating, VehicleAspect};
use super::domain::{DriverId, OrganizationId, SessionId, VehicleId};
use super::risk::RiskInputs;
use super::service::{InspectionService, InspectionServiceError};
use super::session::SessionError;
use super::{InspectionStore, StandardsStore, VehicleDirectory};

/// Router builder exposing HTTP endpoints for the inspection workflow.
pub fn inspection_router<D, S, P>(service: Arc<InspectionService<D, S, P>>) -> Router
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    Router::new()
        .route("/api/v1/inspections", post(begin_handler::<D, S, P>))
        .route(
            "/api/v1/inspections/:session_id/vehicle",
            put(select_vehicle_handler::<D, S, P>),
        )
        .route(
            "/api/v1/inspections/:session_id/observations/:aspect",
            put(observation_handler::<D, S, P>),
        )
        .route(
            "/api/v1/inspections/:session_id/submit",
            post(submit_handler::<D, S, P>),
        )
        .route(
            "/api/v1/drivers/:driver_id/risk",
            post(risk_handler::<D, S, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct BeginRequest {
    driver_id: String,
    organization_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectVehicleRequest {
    vehicle_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ObservationRequest {
    rating: String,
    #[serde(default)]
    note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    evaluation_date: NaiveDate,
    #[serde(default)]
    mileage: Option<u32>,
    #[serde(default)]
    fuel_level: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RiskRequest {
    organization_id: String,
    score_date: NaiveDate,
    vehicle_check_score: u8,
    safety_score: u8,
    documentation_score: u8,
    #[serde(default)]
    incident_count: u32,
}

pub(crate) async fn begin_handler<D, S, P>(
    State(service): State<Arc<InspectionService<D, S, P>>>,
    Json(request): Json<BeginRequest>,
) -> Response
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    match service.begin_inspection(
        DriverId(request.driver_id),
        OrganizationId(request.organization_id),
    ) {
        Ok(session_id) => (
            StatusCode::CREATED,
            Json(json!({ "session_id": session_id.0 })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn select_vehicle_handler<D, S, P>(
    State(service): State<Arc<InspectionService<D, S, P>>>,
    Path(session_id): Path<String>,
    Json(request): Json<SelectVehicleRequest>,
) -> Response
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    let id = SessionId(session_id);
    match service.select_vehicle(&id, VehicleId(request.vehicle_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn observation_handler<D, S, P>(
    State(service): State<Arc<InspectionService<D, S, P>>>,
    Path((session_id, aspect)): Path<(String, String)>,
    Json(request): Json<ObservationRequest>,
) -> Response
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    let id = SessionId(session_id);

    let Some(aspect) = VehicleAspect::from_key(&aspect) else {
        let payload = json!({ "error": format!("unknown vehicle aspect '{aspect}'") });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };
    let Some(rating) = ConditionRating::from_key(&request.rating) else {
        let payload = json!({ "error": format!("unknown condition rating '{}'", request.rating) });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
    };

    match service.set_observation(&id, aspect, rating, request.note) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<D, S, P>(
    State(service): State<Arc<InspectionService<D, S, P>>>,
    Path(session_id): Path<String>,
    Json(request): Json<SubmitRequest>,
) -> Response
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    let id = SessionId(session_id);

    // Late-arriving odometer/fuel readings may ride along with submission.
    if let Some(mileage) = request.mileage {
        if let Err(error) = service.set_mileage(&id, mileage) {
            return error_response(error);
        }
    }
    if let Some(fuel_level) = request.fuel_level {
        if let Err(error) = service.set_fuel_level(&id, fuel_level) {
            return error_response(error);
        }
    }

    match service.submit_inspection(&id, request.evaluation_date) {
        Ok(score) => (StatusCode::OK, Json(score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn risk_handler<D, S, P>(
    State(service): State<Arc<InspectionService<D, S, P>>>,
    Path(driver_id): Path<String>,
    Json(request): Json<RiskRequest>,
) -> Response
where
    D: VehicleDirectory + 'static,
    S: StandardsStore + 'static,
    P: InspectionStore + 'static,
{
    let inputs = RiskInputs {
        vehicle_check_score: request.vehicle_check_score,
        safety_score: request.safety_score,
        documentation_score: request.documentation_score,
        incident_count: request.incident_count,
    };

    match service.compute_driver_risk(
        DriverId(driver_id),
        OrganizationId(request.organization_id),
        request.score_date,
        inputs,
    ) {
        Ok(record) => {
            let payload = json!({
                "driver_id": record.driver.0,
                "score_date": record.score_date,
                "overall_score": record.overall_score,
                "risk_level": record.risk_level_label(),
                "notes": record.notes,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: InspectionServiceError) -> Response {
    match error {
        InspectionServiceError::NoVehicleAvailable => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        InspectionServiceError::SessionNotFound(_) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        InspectionServiceError::Session(SessionError::Incomplete(missing)) => {
            let payload = json!({
                "error": "inspection is incomplete",
                "missing": missing
                    .iter()
                    .map(|field| field.describe())
                    .collect::<Vec<_>>(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        InspectionServiceError::Session(session_error) => {
            let payload = json!({ "error": session_error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        other => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
