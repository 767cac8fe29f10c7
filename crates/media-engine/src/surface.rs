//! GPU-shareable frame buffer metadata.

use serde::{Deserialize, Serialize};

/// Pixel layout of the shared buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceFormat {
    #[default]
    Bgra8,
    Rgba8,
}

/// Describes the GPU-shareable buffer the host renderer samples for the
/// current video frame.
///
/// `shared_handle` is an opaque cross-process handle owned by the engine;
/// zero means the engine has not produced a frame yet. `width`/`height` are
/// the allocated buffer size, `visible_width`/`visible_height` the region
/// that actually carries video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub shared_handle: u64,
    pub width: u32,
    pub height: u32,
    pub visible_width: u32,
    pub visible_height: u32,
    pub format: SurfaceFormat,
}

impl SurfaceDescriptor {
    /// True until the engine fills in a real shared handle.
    pub fn is_empty(&self) -> bool {
        self.shared_handle == 0
    }
}
