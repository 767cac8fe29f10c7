use thiserror::Error;

/// Native error classes an engine reports through its error callback.
///
/// Mirrors the usual media-engine taxonomy; the paired `status` value on
/// [`EngineError::Runtime`] carries the backend-specific status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorCode {
    Aborted,
    Network,
    Decode,
    SourceNotSupported,
    Encrypted,
}

#[derive(Debug, Error)]
pub enum EngineError {
    /// The source descriptor could not be turned into a playable engine
    /// source. Reported synchronously from session creation; never retried.
    #[error("cannot resolve source `{uri}`: {reason}")]
    SourceResolution { uri: String, reason: String },

    /// Reported via the engine's error callback. Logged and non-fatal.
    #[error("engine runtime error {code:?} (status {status})")]
    Runtime { code: EngineErrorCode, status: i32 },

    #[error("media platform startup failed: {0}")]
    PlatformStartup(String),

    #[error("surface descriptor update failed: {0}")]
    Surface(String),

    /// The session was already torn down when the call arrived.
    #[error("session is disposed")]
    Disposed,
}
