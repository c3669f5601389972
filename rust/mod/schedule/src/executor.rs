//! Execution boundary: where dispatch units leave the core.

use tracing::info;

use crate::model::DispatchUnit;

/// Receives dispatch units for execution on a branch terminal.
///
/// Fire-and-forget: the core neither waits for nor inspects the outcome.
/// Implementations must not block; remote transports should spawn.
pub trait Executor: Send + Sync {
    fn execute(&self, unit: &DispatchUnit);
}

impl<F> Executor for F
where
    F: Fn(&DispatchUnit) + Send + Sync,
{
    fn execute(&self, unit: &DispatchUnit) {
        self(unit)
    }
}

/// Simulated transport: logs each unit instead of contacting the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogExecutor;

impl Executor for LogExecutor {
    fn execute(&self, unit: &DispatchUnit) {
        info!(
            job = %unit.job_name,
            branch = %unit.branch,
            terminal = %unit.terminal,
            location = %unit.location,
            at = %unit.dispatch_time,
            "executing scheduled file"
        );
    }
}
