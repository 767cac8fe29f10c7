//! Per-instance video playback session control.
//!
//! This crate owns the lifecycle of one playing video on top of an opaque
//! native media engine: source resolution, transport, buffering state, event
//! emission toward the host listener, and the negotiation of the shared GPU
//! surface the host compositor polls. The engine itself lives behind the
//! traits in `media-engine`; this crate only orchestrates it.

mod apartment;
mod events;
mod session;
mod surface;

pub mod interop;

pub use apartment::Apartment;
pub use events::{EventSink, PlayerEvent};
pub use session::{HostWindow, StreamHandler, TextureRegistry, VideoSession};
pub use surface::{SurfaceGuard, WindowRect, DEFAULT_WINDOW_SIZE};

// The engine-facing vocabulary, re-exported so hosts can depend on one crate.
pub use media_engine::{
    BufferingState, EngineCallbacks, EngineError, EngineErrorCode, EngineFactory, MediaEngine,
    PlatformRef, PlatformRuntime, SourceDescriptor, SurfaceDescriptor, SurfaceFormat, TimeRange,
};
