use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use fleetwatch_core::{Ack, ServiceError};

use crate::service::SettingsService;

type SettingsState = Arc<SettingsService>;

/// Routes:
/// - `GET  /config`: current document (`{}` when never saved)
/// - `POST /config`: replace the document
pub fn router(service: Arc<SettingsService>) -> Router {
    Router::new()
        .route("/config", get(get_config).post(save_config))
        .with_state(service)
}

async fn get_config(State(service): State<SettingsState>) -> Result<Json<Value>, ServiceError> {
    Ok(Json(service.get_config()?))
}

async fn save_config(
    State(service): State<SettingsState>,
    Json(doc): Json<Value>,
) -> Result<Json<Ack>, ServiceError> {
    service.save_config(doc)?;
    Ok(Json(Ack::new("configuration updated")))
}
