//! Headless probe for the playback session core.
//!
//! Creates one session over a scripted engine double, attaches a listener,
//! replays the engine's callback script, and issues frame requests while it
//! runs. Emitted events print to stdout as JSON lines; everything else goes
//! through tracing.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use playback_session::{
    EventSink, HostWindow, PlayerEvent, SourceDescriptor, TextureRegistry, VideoSession,
    WindowRect,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod scripted;

use scripted::ScriptedFactory;

#[derive(Parser, Debug)]
#[command(
    name = "playback-probe",
    about = "Drive a scripted playback session and print its events"
)]
struct Args {
    /// Source URI handed to the engine double.
    #[arg(default_value = "probe://sample.mp4")]
    uri: String,

    /// Frame request width.
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Frame request height.
    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Number of frame requests to issue while the script runs.
    #[arg(long, default_value_t = 3)]
    frames: u32,

    /// Seek target in milliseconds, issued before play so the session
    /// resumes from it.
    #[arg(long)]
    seek_ms: Option<u64>,

    /// Report this window size (WxH) instead of "unavailable".
    #[arg(long, value_parser = parse_size)]
    window: Option<(u32, u32)>,
}

fn parse_size(raw: &str) -> std::result::Result<(u32, u32), String> {
    let (w, h) = raw
        .split_once('x')
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w.parse().map_err(|e| format!("bad width: {e}"))?;
    let height = h.parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((width, height))
}

struct FixedWindow(Option<WindowRect>);

impl HostWindow for FixedWindow {
    fn client_rect(&self) -> Option<WindowRect> {
        self.0
    }
}

struct JsonSink;

impl EventSink for JsonSink {
    fn on_event(&self, event: PlayerEvent) {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(%err, "failed to encode event"),
        }
    }
}

struct LoggingRegistry;

impl TextureRegistry for LoggingRegistry {
    fn mark_frame_available(&self, texture_id: i64) {
        info!(texture_id, "frame available");
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
    let args = Args::parse();

    let factory = ScriptedFactory::new();
    let window = Arc::new(FixedWindow(
        args.window.map(|(width, height)| WindowRect { width, height }),
    ));
    let session = VideoSession::create(
        &factory,
        window,
        Some(SourceDescriptor::from_uri(&args.uri)),
    )?;
    let handler = session.attach(1, Arc::new(LoggingRegistry));
    handler.on_listen(Arc::new(JsonSink));

    let script = factory.spawn_script();

    if let Some(seek_ms) = args.seek_ms {
        session.seek_to(seek_ms);
    }
    session.play();

    for _ in 0..args.frames {
        let descriptor = session.obtain_surface(args.width, args.height)?;
        info!(
            handle = descriptor.shared_handle,
            width = descriptor.width,
            height = descriptor.height,
            "frame descriptor refreshed"
        );
        drop(descriptor);
        thread::sleep(Duration::from_millis(40));
    }

    script
        .join()
        .map_err(|_| anyhow!("engine script panicked"))?;
    info!(position_ms = session.position(), "script complete");
    session.dispose();
    Ok(())
}
