use thiserror::Error;

#[derive(Error, Debug)]
pub enum KVError {
    /// The backing database could not be opened or a transaction failed.
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl KVError {
    pub(crate) fn storage<E: std::fmt::Display>(e: E) -> Self {
        KVError::Storage(e.to_string())
    }
}
