//! Lock-protected shared surface state.

use std::ops::Deref;

use media_engine::SurfaceDescriptor;
use parking_lot::{Mutex, MutexGuard};

/// Display size assumed until the host window reports real geometry.
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (640, 480);

/// Logical window rectangle in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowRect {
    pub width: u32,
    pub height: u32,
}

impl WindowRect {
    pub fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

pub(crate) struct SurfaceState {
    pub(crate) descriptor: SurfaceDescriptor,
    pub(crate) window_size: (u32, u32),
}

/// The session's surface descriptor plus the display geometry it was last
/// negotiated against.
///
/// Both live behind one mutex: concurrent frame requests, the geometry
/// refresh, and the engine resize all read or write this state, so they
/// serialize here. Callers cannot reach the descriptor without the lock.
pub(crate) struct SharedSurface {
    state: Mutex<SurfaceState>,
}

impl SharedSurface {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                descriptor: SurfaceDescriptor::default(),
                window_size: DEFAULT_WINDOW_SIZE,
            }),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock()
    }
}

/// Borrowed view of the descriptor produced by a frame request.
///
/// Holding the guard keeps the descriptor stable; drop it before issuing the
/// next frame request, or that request will block behind it.
pub struct SurfaceGuard<'a> {
    pub(crate) state: MutexGuard<'a, SurfaceState>,
}

impl Deref for SurfaceGuard<'_> {
    type Target = SurfaceDescriptor;

    fn deref(&self) -> &SurfaceDescriptor {
        &self.state.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_the_default_display_size_and_an_empty_descriptor() {
        let surface = SharedSurface::new();
        let state = surface.lock();
        assert_eq!(state.window_size, DEFAULT_WINDOW_SIZE);
        assert!(state.descriptor.is_empty());
    }

    #[test]
    fn guard_exposes_the_latest_descriptor() {
        let surface = SharedSurface::new();
        {
            let mut state = surface.lock();
            state.descriptor.shared_handle = 9;
            state.descriptor.width = 320;
            state.descriptor.height = 240;
        }
        let guard = SurfaceGuard {
            state: surface.lock(),
        };
        assert_eq!(guard.shared_handle, 9);
        assert_eq!((guard.width, guard.height), (320, 240));
    }

    #[test]
    fn zero_sized_rects_are_degenerate() {
        assert!(WindowRect { width: 0, height: 480 }.is_degenerate());
        assert!(WindowRect { width: 640, height: 0 }.is_degenerate());
        assert!(!WindowRect { width: 640, height: 480 }.is_degenerate());
    }
}
