//! Scripted engine double backing the probe.
//!
//! Plays the callback sequence a real engine produces when a source resolves
//! cleanly: a starved buffering signal, initialization, readiness, then end
//! of stream. Transport and surface operations behave like the real thing at
//! the interface level without touching any platform API.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use media_engine::{
    BufferingState, EngineCallbacks, EngineError, EngineFactory, MediaEngine, PlatformRuntime,
    SourceDescriptor, SurfaceDescriptor, TimeRange,
};
use parking_lot::Mutex;
use tracing::{debug, info};

const DURATION_MS: u64 = 63_000;
const NATIVE_SIZE: (u32, u32) = (1280, 720);

struct ProbePlatform;

impl PlatformRuntime for ProbePlatform {
    fn startup(&self) -> Result<(), EngineError> {
        info!("probe media platform started");
        Ok(())
    }

    fn shutdown(&self) {
        info!("probe media platform shut down");
    }
}

#[derive(Default)]
struct EngineState {
    position_ms: u64,
    descriptors: u64,
}

struct ScriptedEngine {
    state: Mutex<EngineState>,
}

impl MediaEngine for ScriptedEngine {
    fn load(&self, source: &SourceDescriptor) -> Result<(), EngineError> {
        if source.uri.is_empty() {
            return Err(EngineError::SourceResolution {
                uri: source.uri.clone(),
                reason: "empty uri".into(),
            });
        }
        info!(uri = %source.uri, "source resolved");
        Ok(())
    }

    fn start_playing_from(&self, position_ms: u64) {
        debug!(position_ms, "playback started");
    }

    fn pause(&self) {
        debug!("playback paused");
    }

    fn seek_to(&self, position_ms: u64) {
        self.state.lock().position_ms = position_ms;
    }

    fn set_looping(&self, looping: bool) {
        debug!(looping, "looping updated");
    }

    fn set_volume(&self, volume: f64) {
        debug!(volume, "volume updated");
    }

    fn set_playback_rate(&self, rate: f64) {
        debug!(rate, "playback rate updated");
    }

    fn media_time(&self) -> u64 {
        self.state.lock().position_ms
    }

    fn duration(&self) -> u64 {
        DURATION_MS
    }

    fn native_video_size(&self) -> (u32, u32) {
        NATIVE_SIZE
    }

    fn buffered_ranges(&self) -> Vec<TimeRange> {
        let position = self.state.lock().position_ms;
        vec![TimeRange {
            start_ms: position,
            end_ms: (position + 10_000).min(DURATION_MS),
        }]
    }

    fn update_surface_descriptor(
        &self,
        width: u32,
        height: u32,
        frame_ready: &mut dyn FnMut(),
        descriptor: &mut SurfaceDescriptor,
    ) -> Result<(), EngineError> {
        let handle = {
            let mut state = self.state.lock();
            state.descriptors += 1;
            state.descriptors
        };
        descriptor.shared_handle = handle;
        descriptor.width = width;
        descriptor.height = height;
        descriptor.visible_width = width.min(NATIVE_SIZE.0);
        descriptor.visible_height = height.min(NATIVE_SIZE.1);
        frame_ready();
        Ok(())
    }

    fn update_window_size(&self, width: u32, height: u32) {
        debug!(width, height, "render target resized");
    }
}

/// Builds one scripted engine per session and replays the callback script on
/// a background thread, the way a real engine's worker threads would.
pub struct ScriptedFactory {
    callbacks: Mutex<Option<Arc<dyn EngineCallbacks>>>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(None),
        }
    }

    /// Fire the happy-path callback sequence against the most recently
    /// created session.
    pub fn spawn_script(&self) -> JoinHandle<()> {
        let callbacks = self
            .callbacks
            .lock()
            .clone()
            .expect("create a session before running the script");
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            callbacks.on_buffering_state_changed(BufferingState::HaveNothing);
            thread::sleep(Duration::from_millis(30));
            callbacks.on_initialized();
            callbacks.on_buffering_state_changed(BufferingState::HaveEnoughData);
            thread::sleep(Duration::from_millis(120));
            callbacks.on_playback_ended();
        })
    }
}

impl EngineFactory for ScriptedFactory {
    fn platform(&self) -> Arc<dyn PlatformRuntime> {
        Arc::new(ProbePlatform)
    }

    fn create_engine(
        &self,
        callbacks: Arc<dyn EngineCallbacks>,
    ) -> Result<Box<dyn MediaEngine>, EngineError> {
        *self.callbacks.lock() = Some(callbacks);
        Ok(Box::new(ScriptedEngine {
            state: Mutex::new(EngineState::default()),
        }))
    }
}
