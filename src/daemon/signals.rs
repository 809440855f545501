//! Signal-driven shutdown flag for the monitor loop.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::core::errors::{Result, WardenError};

/// Register SIGINT/SIGTERM handlers that flip a shared flag.
///
/// The monitor loop polls the flag between tailer polls, so shutdown is
/// cooperative and the current line batch always finishes processing.
pub fn install() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    #[cfg(unix)]
    {
        use signal_hook::consts::{SIGINT, SIGTERM};
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, shutdown.clone()).map_err(|source| {
                WardenError::Runtime {
                    details: format!("failed to register signal {signal}: {source}"),
                }
            })?;
        }
    }
    Ok(shutdown)
}
