//! Progress and completion events for sync runs.

use tokio::sync::mpsc;

/// Event emitted from the background task while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Human-readable status update.
    Progress { message: String },
    /// Terminal event, once per run: outcome summary plus any service
    /// advisory (empty string when none).
    Done {
        description: String,
        advisory: String,
    },
}

/// Handle for emitting sync events
///
/// This is cheaply cloneable. Sends never block the background task; when the
/// receiver is gone the event is dropped.
#[derive(Clone)]
pub struct SyncEvents {
    tx: mpsc::UnboundedSender<SyncEvent>,
}

impl SyncEvents {
    pub fn emit(&self, event: SyncEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("No sync event listener, event dropped");
        }
    }

    pub fn progress(&self, message: impl Into<String>) {
        self.emit(SyncEvent::Progress {
            message: message.into(),
        });
    }

    pub fn done(&self, description: impl Into<String>, advisory: impl Into<String>) {
        self.emit(SyncEvent::Done {
            description: description.into(),
            advisory: advisory.into(),
        });
    }
}

/// Create the event channel: a handle for the background task and the
/// receiver for the caller.
pub fn sync_event_channel() -> (SyncEvents, mpsc::UnboundedReceiver<SyncEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (SyncEvents { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_progress() {
        let (events, mut rx) = sync_event_channel();
        events.progress("Updating 42 series...");

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            SyncEvent::Progress {
                message: "Updating 42 series...".to_string()
            }
        );
    }

    #[test]
    fn test_emit_done_with_advisory() {
        let (events, mut rx) = sync_event_channel();
        events.done("no updates were found", "Maintenance tonight");

        match rx.try_recv().unwrap() {
            SyncEvent::Done {
                description,
                advisory,
            } => {
                assert_eq!(description, "no updates were found");
                assert_eq!(advisory, "Maintenance tonight");
            }
            other => panic!("Unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_emit_after_receiver_dropped() {
        let (events, rx) = sync_event_channel();
        drop(rx);

        // Must not panic or block
        events.progress("anyone there?");
    }

    #[test]
    fn test_cloned_handles_share_channel() {
        let (events, mut rx) = sync_event_channel();
        let cloned = events.clone();

        events.progress("one");
        cloned.progress("two");

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }
}
