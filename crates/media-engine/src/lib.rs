//! Abstraction over native hardware-accelerated media engines.
//!
//! A playback session drives its engine exclusively through [`MediaEngine`]
//! and hears back through [`EngineCallbacks`]; concrete backends (Media
//! Foundation, AVFoundation, test doubles) live behind these traits so the
//! session controller never touches a platform API directly.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod error;
mod platform;
mod surface;

pub use error::{EngineError, EngineErrorCode};
pub use platform::{PlatformRef, PlatformRuntime};
pub use surface::{SurfaceDescriptor, SurfaceFormat};

/// Engine-reported readiness of decoded data, the usual `HAVE_*` ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BufferingState {
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

impl BufferingState {
    /// True when the engine has nothing decodable at the current position.
    pub fn is_starved(self) -> bool {
        matches!(self, BufferingState::HaveNothing)
    }
}

/// Everything needed to resolve a playable source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub uri: String,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

impl SourceDescriptor {
    pub fn from_uri(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            http_headers: HashMap::new(),
        }
    }
}

/// One contiguous buffered span, in media milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start_ms: u64,
    pub end_ms: u64,
}

/// Callbacks the engine invokes as playback progresses.
///
/// Implemented by the session controller; the engine only ever holds this
/// interface, never the concrete controller. Every method may be invoked
/// from engine-internal threads at any time, including after the session
/// started tearing down.
pub trait EngineCallbacks: Send + Sync {
    fn on_initialized(&self);
    fn on_error(&self, code: EngineErrorCode, status: i32);
    fn on_buffering_state_changed(&self, state: BufferingState);
    fn on_playback_ended(&self);
}

/// Operation set of a native media engine.
///
/// Transport operations are safe to call from any thread.
/// [`update_window_size`](MediaEngine::update_window_size) mutates
/// render-target state with strict thread affinity; callers marshal it onto
/// the engine apartment.
pub trait MediaEngine: Send + Sync {
    /// Resolve `source` and initialize the engine with it. Readiness is
    /// reported later through [`EngineCallbacks`].
    fn load(&self, source: &SourceDescriptor) -> Result<(), EngineError>;

    fn start_playing_from(&self, position_ms: u64);
    fn pause(&self);
    fn seek_to(&self, position_ms: u64);
    fn set_looping(&self, looping: bool);
    fn set_volume(&self, volume: f64);
    fn set_playback_rate(&self, rate: f64);

    fn media_time(&self) -> u64;
    fn duration(&self) -> u64;
    fn native_video_size(&self) -> (u32, u32);
    fn buffered_ranges(&self) -> Vec<TimeRange>;

    /// Produce or refresh a shared buffer of at least `width` x `height`,
    /// writing its metadata into `descriptor` and invoking `frame_ready`
    /// once the buffer can be sampled.
    fn update_surface_descriptor(
        &self,
        width: u32,
        height: u32,
        frame_ready: &mut dyn FnMut(),
        descriptor: &mut SurfaceDescriptor,
    ) -> Result<(), EngineError>;

    /// Resize the engine render target to the current display size.
    fn update_window_size(&self, width: u32, height: u32);
}

/// Constructs one engine per session around the session's callback hooks,
/// and names the backend's process-wide subsystem runtime.
pub trait EngineFactory {
    fn platform(&self) -> Arc<dyn PlatformRuntime>;

    fn create_engine(
        &self,
        callbacks: Arc<dyn EngineCallbacks>,
    ) -> Result<Box<dyn MediaEngine>, EngineError>;
}
