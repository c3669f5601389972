use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use fleetwatch_core::ServiceError;

use crate::model::{FileEntry, FileRequest};
use crate::service::FileRegistry;

type RegistryState = Arc<FileRegistry>;

/// Routes (`/arquivos` mirrors `/files`):
/// - `GET  /files`     : list entries
/// - `POST /files`     : register an entry
/// - `GET  /files/{id}`: fetch one entry
/// - `PUT  /files/{id}`: edit an entry
pub fn router(registry: Arc<FileRegistry>) -> Router {
    Router::new()
        .route("/files", get(list_files).post(create_file))
        .route("/files/{id}", get(get_file).put(update_file))
        .route("/arquivos", get(list_files).post(create_file))
        .route("/arquivos/{id}", get(get_file).put(update_file))
        .with_state(registry)
}

#[derive(Debug, Serialize)]
struct CreateAck {
    msg: &'static str,
    id: String,
}

async fn list_files(
    State(registry): State<RegistryState>,
) -> Result<Json<Vec<FileEntry>>, ServiceError> {
    Ok(Json(registry.list()?))
}

async fn create_file(
    State(registry): State<RegistryState>,
    Json(req): Json<FileRequest>,
) -> Result<Json<CreateAck>, ServiceError> {
    let entry = registry.create(req)?;
    Ok(Json(CreateAck {
        msg: "file registered",
        id: entry.id,
    }))
}

async fn get_file(
    State(registry): State<RegistryState>,
    Path(id): Path<String>,
) -> Result<Json<FileEntry>, ServiceError> {
    Ok(Json(registry.get(&id)?))
}

async fn update_file(
    State(registry): State<RegistryState>,
    Path(id): Path<String>,
    Json(req): Json<FileRequest>,
) -> Result<Json<FileEntry>, ServiceError> {
    Ok(Json(registry.update(&id, req)?))
}
