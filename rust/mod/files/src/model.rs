use serde::{Deserialize, Serialize};

use fleetwatch_core::ServiceError;

/// An executable file that branch terminals can be told to fetch and run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub url: String,
    pub description: String,
    pub destination: String,
    pub version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Body of `POST /files` and `PUT /files/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileRequest {
    #[serde(default, alias = "nome")]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "descricao")]
    pub description: Option<String>,
    #[serde(default, alias = "destino")]
    pub destination: Option<String>,
    #[serde(default, alias = "versao")]
    pub version: Option<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ServiceError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

impl FileRequest {
    /// Build a new entry. Every field is mandatory.
    pub fn into_entry(self, id: String) -> Result<FileEntry, ServiceError> {
        Ok(FileEntry {
            id,
            name: required(self.name, "name")?,
            url: required(self.url, "url")?,
            description: required(self.description, "description")?,
            destination: required(self.destination, "destination")?,
            version: required(self.version, "version")?,
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    /// Apply an edit to `existing`. The name may be omitted and is then kept.
    pub fn apply_to(self, existing: FileEntry) -> Result<FileEntry, ServiceError> {
        let name = match self.name {
            Some(n) if !n.trim().is_empty() => n,
            _ => existing.name,
        };
        Ok(FileEntry {
            name,
            url: required(self.url, "url")?,
            description: required(self.description, "description")?,
            destination: required(self.destination, "destination")?,
            version: required(self.version, "version")?,
            ..existing
        })
    }
}
