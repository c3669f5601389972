use axum::Router;

/// A service module that contributes HTTP routes.
///
/// Each business module (status, schedule, files, settings) implements this
/// trait. The server binary collects all modules and nests their routes under
/// the `/api` prefix.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes. Paths are relative to `/api`.
    fn routes(&self) -> Router;
}
