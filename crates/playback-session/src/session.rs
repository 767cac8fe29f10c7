//! Per-instance playback session controller.
//!
//! A [`VideoSession`] owns exactly one engine for its whole lifetime and
//! mediates between three independent timelines: host transport commands,
//! engine callbacks, and compositor frame requests. Engine callbacks reach
//! the session through a `Weak` hook object, so an engine that outlives its
//! session degrades to dropped callbacks instead of use-after-teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use media_engine::{
    BufferingState, EngineCallbacks, EngineError, EngineErrorCode, EngineFactory, MediaEngine,
    PlatformRef, SourceDescriptor,
};
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::apartment::Apartment;
use crate::events::{EventSink, PlayerEvent};
use crate::surface::{SharedSurface, SurfaceGuard, SurfaceState, WindowRect};

/// Host window the video is composited into, queried for current geometry.
pub trait HostWindow: Send + Sync {
    /// Current client rectangle, or `None` while the window is unavailable.
    fn client_rect(&self) -> Option<WindowRect>;
}

/// The host texture registry's side of the frame interface: poked whenever a
/// fresh descriptor is ready under the session's texture handle.
pub trait TextureRegistry: Send + Sync {
    fn mark_frame_available(&self, texture_id: i64);
}

struct TextureBinding {
    texture_id: i64,
    registry: Arc<dyn TextureRegistry>,
}

struct SessionShared {
    engine: OnceLock<Box<dyn MediaEngine>>,
    valid: AtomicBool,
    initialized: AtomicBool,
    buffering: AtomicBool,
    listener: Mutex<Option<Arc<dyn EventSink>>>,
    binding: OnceLock<TextureBinding>,
    window: Arc<dyn HostWindow>,
    surface: SharedSurface,
    apartment: Arc<Apartment>,
    _platform: PlatformRef,
}

impl SessionShared {
    fn engine(&self) -> Option<&dyn MediaEngine> {
        self.engine.get().map(|engine| &**engine)
    }

    fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Push an event to the listener, or drop it silently when detached.
    /// The sink is cloned out of the lock first, so a concurrent detach
    /// costs at most one event delivered to the old sink.
    fn emit(&self, event: PlayerEvent) {
        let sink = self.listener.lock().clone();
        match sink {
            Some(sink) => sink.on_event(event),
            None => debug!(?event, "event dropped, no listener attached"),
        }
    }

    /// One-way transition to initialized; the event fires exactly once, on
    /// the transition.
    fn mark_initialized(&self) {
        if self.initialized.swap(true, Ordering::AcqRel) {
            return;
        }
        let Some(engine) = self.engine() else { return };
        let duration = engine.duration();
        let (width, height) = engine.native_video_size();
        self.emit(PlayerEvent::Initialized {
            duration,
            width,
            height,
        });
    }

    fn send_buffering_update(&self) {
        let Some(engine) = self.engine() else { return };
        let values = engine
            .buffered_ranges()
            .into_iter()
            .map(|range| [range.start_ms, range.end_ms])
            .collect();
        self.emit(PlayerEvent::BufferingUpdate { values });
    }

    /// Re-read the host window rectangle, then push the current display size
    /// (not the buffer size) to the engine render target on the apartment.
    fn refresh_window_geometry(shared: &Arc<Self>, state: &mut SurfaceState) {
        if let Some(rect) = shared.window.client_rect() {
            if !rect.is_degenerate() {
                state.window_size = (rect.width, rect.height);
            }
        }
        let (width, height) = state.window_size;
        let target = Arc::clone(shared);
        shared.apartment.run(move || {
            if let Some(engine) = target.engine() {
                engine.update_window_size(width, height);
            }
        });
    }
}

/// Listener attach/detach handler pair for the host event channel.
///
/// `on_listen` stores the sink, `on_cancel` clears it; both are safe to call
/// at any point in the session's life, including concurrently with event
/// emission.
pub struct StreamHandler {
    shared: Weak<SessionShared>,
}

impl StreamHandler {
    pub fn on_listen(&self, sink: Arc<dyn EventSink>) {
        if let Some(shared) = self.shared.upgrade() {
            if shared.is_valid() {
                *shared.listener.lock() = Some(sink);
            }
        }
    }

    pub fn on_cancel(&self) {
        if let Some(shared) = self.shared.upgrade() {
            *shared.listener.lock() = None;
        }
    }
}

/// Callback hooks handed to the engine at construction. Every entry point
/// upgrades the weak session reference and checks validity, so callbacks
/// arriving after dispose are dropped rather than acted on.
struct EngineHooks {
    shared: Weak<SessionShared>,
}

impl EngineHooks {
    fn with_live_session(&self, f: impl FnOnce(&Arc<SessionShared>)) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        if !shared.is_valid() {
            debug!("engine callback after dispose dropped");
            return;
        }
        f(&shared);
    }
}

impl EngineCallbacks for EngineHooks {
    fn on_initialized(&self) {
        self.with_live_session(|shared| {
            if let Some(engine) = shared.engine() {
                // Restart from the beginning on every initialization signal,
                // even a repeated one; the event below still fires once.
                engine.seek_to(0);
            }
            shared.mark_initialized();
        });
    }

    fn on_error(&self, code: EngineErrorCode, status: i32) {
        self.with_live_session(|_| {
            error!(?code, status, "media engine error");
        });
    }

    fn on_buffering_state_changed(&self, state: BufferingState) {
        self.with_live_session(|shared| {
            if state.is_starved() {
                if !shared.buffering.swap(true, Ordering::AcqRel) {
                    shared.emit(PlayerEvent::BufferingStart);
                }
                shared.send_buffering_update();
            } else {
                // Engines may signal readiness through the buffering ladder
                // instead of the dedicated initialized callback.
                shared.mark_initialized();
                if shared.buffering.swap(false, Ordering::AcqRel) {
                    shared.emit(PlayerEvent::BufferingEnd);
                }
            }
        });
    }

    fn on_playback_ended(&self) {
        self.with_live_session(|shared| {
            shared.emit(PlayerEvent::Completed);
        });
    }
}

/// One playing video: source resolution, transport, buffering state, and the
/// shared GPU surface its consumer polls.
pub struct VideoSession {
    shared: Arc<SessionShared>,
}

impl VideoSession {
    /// Create a session around a fresh engine from `factory`. With a
    /// `source`, the engine resolves it immediately and
    /// [`EngineError::SourceResolution`] propagates to the caller; without
    /// one the session waits for [`load`](Self::load).
    pub fn create(
        factory: &dyn EngineFactory,
        window: Arc<dyn HostWindow>,
        source: Option<SourceDescriptor>,
    ) -> Result<Self, EngineError> {
        let platform = PlatformRef::acquire(factory.platform())?;
        let shared = Arc::new(SessionShared {
            engine: OnceLock::new(),
            valid: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
            buffering: AtomicBool::new(false),
            listener: Mutex::new(None),
            binding: OnceLock::new(),
            window,
            surface: SharedSurface::new(),
            apartment: Apartment::shared(),
            _platform: platform,
        });
        let hooks: Arc<dyn EngineCallbacks> = Arc::new(EngineHooks {
            shared: Arc::downgrade(&shared),
        });
        let engine = factory.create_engine(hooks)?;
        let _ = shared.engine.set(engine);
        if let Some(source) = source {
            match shared.engine() {
                Some(engine) => engine.load(&source)?,
                None => {}
            }
        }
        Ok(Self { shared })
    }

    /// Late source binding for a session created empty.
    pub fn load(&self, source: &SourceDescriptor) -> Result<(), EngineError> {
        if !self.shared.is_valid() {
            return Err(EngineError::Disposed);
        }
        match self.shared.engine() {
            Some(engine) => engine.load(source),
            None => Err(EngineError::Disposed),
        }
    }

    /// Bind the session's immutable texture handle and host registry, and
    /// hand back the stream handler pair the host installs on its event
    /// channel. Repeated calls keep the first binding.
    pub fn attach(&self, texture_id: i64, registry: Arc<dyn TextureRegistry>) -> StreamHandler {
        let _ = self.shared.binding.set(TextureBinding {
            texture_id,
            registry,
        });
        StreamHandler {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Resume from the engine's current media time, never from zero, so a
    /// seek issued while paused survives the next play.
    pub fn play(&self) {
        if !self.shared.is_valid() {
            debug!("play ignored, session disposed");
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.start_playing_from(engine.media_time());
        }
    }

    pub fn pause(&self) {
        if !self.shared.is_valid() {
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.pause();
        }
    }

    pub fn seek_to(&self, position_ms: u64) {
        if !self.shared.is_valid() {
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.seek_to(position_ms);
        }
    }

    pub fn set_looping(&self, looping: bool) {
        if !self.shared.is_valid() {
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.set_looping(looping);
        }
    }

    pub fn set_volume(&self, volume: f64) {
        if !self.shared.is_valid() {
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.set_volume(volume);
        }
    }

    pub fn set_playback_speed(&self, rate: f64) {
        if !self.shared.is_valid() {
            return;
        }
        if let Some(engine) = self.shared.engine() {
            engine.set_playback_rate(rate);
        }
    }

    /// Current media time in milliseconds; 0 once disposed.
    pub fn position(&self) -> u64 {
        if !self.shared.is_valid() {
            return 0;
        }
        self.shared.engine().map_or(0, |engine| engine.media_time())
    }

    /// Negotiate the shared surface for a frame request of at least
    /// `width` x `height`.
    ///
    /// Under the surface lock: the engine refreshes the descriptor (firing
    /// the frame-available notification toward the host registry), the host
    /// window geometry is re-read, and the engine render target is resized
    /// to the current display size on the shared apartment. The returned
    /// guard stays valid until the next mutation; drop it before the next
    /// request.
    pub fn obtain_surface(
        &self,
        width: u32,
        height: u32,
    ) -> Result<SurfaceGuard<'_>, EngineError> {
        let shared = &self.shared;
        if !shared.is_valid() {
            return Err(EngineError::Disposed);
        }
        let engine = shared.engine().ok_or(EngineError::Disposed)?;
        let mut state = shared.surface.lock();

        let mut frame_ready = || {
            if let Some(binding) = shared.binding.get() {
                binding.registry.mark_frame_available(binding.texture_id);
            }
        };
        engine.update_surface_descriptor(width, height, &mut frame_ready, &mut state.descriptor)?;

        SessionShared::refresh_window_geometry(shared, &mut state);
        Ok(SurfaceGuard { state })
    }

    /// Pause the engine when initialized, then detach the host channel.
    /// Later calls are no-ops; callbacks arriving afterwards are dropped.
    pub fn dispose(&self) {
        if !self.shared.valid.swap(false, Ordering::AcqRel) {
            return;
        }
        if self.shared.initialized.load(Ordering::Acquire) {
            if let Some(engine) = self.shared.engine() {
                engine.pause();
            }
        }
        *self.shared.listener.lock() = None;
        debug!("session disposed");
    }

    pub fn is_valid(&self) -> bool {
        self.shared.is_valid()
    }

    pub fn is_initialized(&self) -> bool {
        self.shared.initialized.load(Ordering::Acquire)
    }

    /// The texture handle bound at attach time, if any.
    pub fn texture_id(&self) -> Option<i64> {
        self.shared.binding.get().map(|binding| binding.texture_id)
    }
}

impl Drop for VideoSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
