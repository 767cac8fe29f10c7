//! Structured playback events pushed to the host listener.

use serde::Serialize;

/// Events delivered to an attached [`EventSink`].
///
/// The serialized form is the host wire shape: a map with an `event`
/// discriminator, e.g. `{"event":"bufferingUpdate","values":[[0,1500]]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PlayerEvent {
    Initialized {
        duration: u64,
        width: u32,
        height: u32,
    },
    Completed,
    BufferingStart,
    BufferingEnd,
    /// One `[start_ms, end_ms]` pair per contiguous buffered range, in the
    /// order the engine reported them.
    BufferingUpdate { values: Vec<[u64; 2]> },
}

/// Host-side listener for session events.
///
/// May be attached and detached at any time; the session silently drops
/// events emitted while no sink is attached.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: PlayerEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initialized_wire_shape() {
        let event = PlayerEvent::Initialized {
            duration: 63_000,
            width: 1280,
            height: 720,
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "initialized", "duration": 63_000, "width": 1280, "height": 720})
        );
    }

    #[test]
    fn marker_events_carry_only_the_discriminator() {
        assert_eq!(
            serde_json::to_value(PlayerEvent::Completed).unwrap(),
            json!({"event": "completed"})
        );
        assert_eq!(
            serde_json::to_value(PlayerEvent::BufferingStart).unwrap(),
            json!({"event": "bufferingStart"})
        );
        assert_eq!(
            serde_json::to_value(PlayerEvent::BufferingEnd).unwrap(),
            json!({"event": "bufferingEnd"})
        );
    }

    #[test]
    fn buffering_update_keeps_engine_order() {
        let event = PlayerEvent::BufferingUpdate {
            values: vec![[30_000, 41_000], [0, 12_500]],
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"event": "bufferingUpdate", "values": [[30_000, 41_000], [0, 12_500]]})
        );
    }
}
