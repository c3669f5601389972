use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use fleetwatch_core::ServiceError;

use crate::model::{BranchStatus, StatusReport};
use crate::service::ReconciliationService;

type ServiceState = Arc<ReconciliationService>;

/// Routes:
/// - `GET  /status`: every stored branch/terminal record
/// - `POST /report`: apply one status report (alias `POST /logs`)
pub fn router(service: Arc<ReconciliationService>) -> Router {
    Router::new()
        .route("/status", get(list_status))
        .route("/report", post(receive_report))
        .route("/logs", post(receive_report))
        .with_state(service)
}

#[derive(Debug, Serialize)]
struct ReportAck {
    msg: &'static str,
    created: bool,
}

async fn list_status(
    State(service): State<ServiceState>,
) -> Result<Json<Vec<BranchStatus>>, ServiceError> {
    Ok(Json(service.list()?))
}

async fn receive_report(
    State(service): State<ServiceState>,
    Json(report): Json<StatusReport>,
) -> Result<Json<ReportAck>, ServiceError> {
    let outcome = service.report(report)?;
    let msg = if outcome.created {
        "branch status created"
    } else {
        "branch status updated"
    };
    Ok(Json(ReportAck {
        msg,
        created: outcome.created,
    }))
}
