use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use fleetwatch_core::{Ack, ServiceError};

use crate::dispatch::Dispatcher;
use crate::model::{DispatchUnit, JobRequest, ScheduledJob};

type DispatchState = Arc<Dispatcher>;

/// Routes:
/// - `GET    /schedules`     : list jobs (`?include_inactive=true` for all)
/// - `POST   /schedules`     : register a job
/// - `GET    /schedules/{id}`: fetch one job
/// - `PUT    /schedules/{id}`: replace a job definition
/// - `DELETE /schedules/{id}`: remove a job
/// - `POST   /dispatch`      : run one pass now, or at `?at=`
///
/// `/execucao` and `/executar` are kept as aliases of the list/register and
/// dispatch routes.
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/schedules", get(list_jobs).post(register_job))
        .route(
            "/schedules/{id}",
            get(get_job).put(update_job).delete(remove_job),
        )
        .route("/execucao", get(list_jobs).post(register_job))
        .route("/dispatch", post(run_dispatch))
        .route("/executar", post(run_dispatch))
        .with_state(dispatcher)
}

#[derive(Debug, Default, Deserialize)]
struct ListParams {
    #[serde(default)]
    include_inactive: bool,
}

#[derive(Debug, Default, Deserialize)]
struct DispatchParams {
    at: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
struct RegisterAck {
    msg: &'static str,
    id: String,
}

#[derive(Debug, Serialize)]
struct DispatchResponse {
    msg: String,
    units: Vec<DispatchUnit>,
}

async fn list_jobs(
    State(dispatcher): State<DispatchState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<ScheduledJob>>, ServiceError> {
    let catalog = dispatcher.catalog();
    let jobs = if params.include_inactive {
        catalog.list()?
    } else {
        catalog.list_active()?
    };
    Ok(Json(jobs))
}

async fn register_job(
    State(dispatcher): State<DispatchState>,
    Json(req): Json<JobRequest>,
) -> Result<Json<RegisterAck>, ServiceError> {
    let job = dispatcher.catalog().register(req)?;
    Ok(Json(RegisterAck {
        msg: "job registered",
        id: job.id,
    }))
}

async fn get_job(
    State(dispatcher): State<DispatchState>,
    Path(id): Path<String>,
) -> Result<Json<ScheduledJob>, ServiceError> {
    Ok(Json(dispatcher.catalog().get(&id)?))
}

async fn update_job(
    State(dispatcher): State<DispatchState>,
    Path(id): Path<String>,
    Json(req): Json<JobRequest>,
) -> Result<Json<ScheduledJob>, ServiceError> {
    Ok(Json(dispatcher.catalog().update(&id, req)?))
}

async fn remove_job(
    State(dispatcher): State<DispatchState>,
    Path(id): Path<String>,
) -> Result<Json<Ack>, ServiceError> {
    dispatcher.catalog().remove(&id)?;
    Ok(Json(Ack::new("job removed")))
}

async fn run_dispatch(
    State(dispatcher): State<DispatchState>,
    Query(params): Query<DispatchParams>,
) -> Result<Json<DispatchResponse>, ServiceError> {
    let now = params.at.unwrap_or_else(|| Local::now().naive_local());
    let outcome = dispatcher.run_pass(now)?;
    let msg = if outcome.is_empty() {
        "no jobs scheduled for this time".to_string()
    } else {
        format!(
            "{} jobs dispatched as {} units",
            outcome.due_jobs,
            outcome.units.len()
        )
    };
    Ok(Json(DispatchResponse {
        msg,
        units: outcome.units,
    }))
}
