//! Process-wide engine subsystem bootstrap.
//!
//! Native media stacks want exactly one startup/shutdown pair per process,
//! while sessions come and go concurrently. [`PlatformRef`] reference-counts
//! live sessions: the first acquisition starts the subsystem, the last drop
//! shuts it down.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::EngineError;

/// Startup/shutdown hooks of a concrete engine backend's subsystem.
pub trait PlatformRuntime: Send + Sync {
    fn startup(&self) -> Result<(), EngineError>;
    fn shutdown(&self);
}

struct PlatformState {
    refs: usize,
    runtime: Option<Arc<dyn PlatformRuntime>>,
}

static PLATFORM: Mutex<PlatformState> = Mutex::new(PlatformState {
    refs: 0,
    runtime: None,
});

/// Keeps the shared media subsystem alive for as long as the guard lives.
///
/// The runtime passed to the first `acquire` wins until the reference count
/// returns to zero; runtimes passed while the subsystem is already up are
/// ignored.
pub struct PlatformRef {
    _priv: (),
}

impl PlatformRef {
    pub fn acquire(runtime: Arc<dyn PlatformRuntime>) -> Result<Self, EngineError> {
        let mut state = PLATFORM.lock();
        if state.refs == 0 {
            runtime.startup()?;
            state.runtime = Some(runtime);
            debug!("media platform started");
        }
        state.refs += 1;
        Ok(Self { _priv: () })
    }
}

impl Drop for PlatformRef {
    fn drop(&mut self) {
        let mut state = PLATFORM.lock();
        state.refs -= 1;
        if state.refs == 0 {
            if let Some(runtime) = state.runtime.take() {
                runtime.shutdown();
                debug!("media platform shut down");
            }
        }
    }
}
