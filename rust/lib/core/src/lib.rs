pub mod config;
pub mod error;
pub mod module;
pub mod types;

pub use config::{ServiceConfig, MAX_TICK_SECS};
pub use error::ServiceError;
pub use module::Module;
pub use types::{Ack, FleetMembers, new_id, now_rfc3339};
