use tokio::sync::mpsc;

use crate::core::errors::ErrorKind;
use crate::core::message::Turn;
use crate::core::session::SessionState;

/// Push-based notifications a UI layer binds to. Mutations and failures each
/// map to exactly one event; nothing is silently duplicated.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    TurnAdded(Turn),
    TurnRemoved(usize),
    StateChanged(SessionState),
    Error { kind: ErrorKind, message: String },
}

/// Sending half of the event surface, held by the session. Delivery is
/// best-effort: a dropped receiver never fails a session operation.
#[derive(Clone)]
pub struct SessionEvents {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEvents {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub(crate) fn turn_added(&self, turn: &Turn) {
        let _ = self.tx.send(SessionEvent::TurnAdded(turn.clone()));
    }

    pub(crate) fn turn_removed(&self, index: usize) {
        let _ = self.tx.send(SessionEvent::TurnRemoved(index));
    }

    pub(crate) fn state_changed(&self, state: SessionState) {
        let _ = self.tx.send(SessionEvent::StateChanged(state));
    }

    pub(crate) fn error(&self, kind: ErrorKind, message: impl Into<String>) {
        let _ = self.tx.send(SessionEvent::Error {
            kind,
            message: message.into(),
        });
    }
}
