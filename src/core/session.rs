//! The chat session state machine.
//!
//! A [`ChatSession`] owns the transcript, enforces single-flight submission,
//! classifies failures, and pushes [`SessionEvent`]s to whatever UI layer is
//! bound to it. Methods take `&self` and are safe to call from concurrently
//! spawned tasks; the state-machine guard is the only lock, and it is never
//! held across an `.await` of config fetching or generation.

use std::fmt;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::config::{ConfigSource, SessionConfig};
use crate::core::errors::SessionError;
use crate::core::events::{SessionEvent, SessionEvents};
use crate::core::message::Turn;
use crate::core::transcript::Transcript;
use crate::generator::ResponseGenerator;

/// User-safe copy recorded in the transcript when generation fails. Backend
/// detail goes to the error value and the log, never to this turn.
pub const GENERATION_FAILURE_NOTICE: &str =
    "I apologize, but I'm having trouble processing your request right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    AwaitingResponse,
    Closed,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::AwaitingResponse => "awaiting-response",
            SessionState::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct SessionInner {
    state: SessionState,
    transcript: Transcript,
    config: Option<SessionConfig>,
}

pub struct ChatSession {
    inner: Mutex<SessionInner>,
    events: SessionEvents,
    config_source: Arc<dyn ConfigSource>,
    generator: Arc<dyn ResponseGenerator>,
    user: String,
    cancel_token: CancellationToken,
}

impl ChatSession {
    /// Build a session for an explicit user identity. Returns the session
    /// and the receiving half of its event surface.
    pub fn new(
        user: impl Into<String>,
        config_source: Arc<dyn ConfigSource>,
        generator: Arc<dyn ResponseGenerator>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = SessionEvents::channel();
        let session = Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                transcript: Transcript::new(),
                config: None,
            }),
            events,
            config_source,
            generator,
            user: user.into(),
            cancel_token: CancellationToken::new(),
        };
        (session, rx)
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    pub async fn transcript_snapshot(&self) -> Vec<Turn> {
        self.inner.lock().await.transcript.snapshot()
    }

    /// Fetch configuration and seed the system context.
    ///
    /// Only meaningful in `Uninitialized`; in any other live state this is a
    /// no-op returning the current state. Both fetch failure and an empty
    /// resolved API key roll the session back to `Uninitialized` so the
    /// caller can retry.
    pub async fn initialize(&self) -> Result<SessionState, SessionError> {
        {
            let mut inner = self.inner.lock().await;
            match inner.state {
                SessionState::Closed => {
                    return Err(self.reject(SessionError::SessionClosed));
                }
                SessionState::Uninitialized => {
                    self.set_state(&mut inner, SessionState::Initializing);
                }
                state => return Ok(state),
            }
        }

        let fetched = tokio::select! {
            result = self.config_source.fetch() => result,
            _ = self.cancel_token.cancelled() => {
                return Err(SessionError::SessionClosed);
            }
        };

        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Initializing {
            // Closed while the fetch was in flight; drop the result.
            return Err(SessionError::SessionClosed);
        }

        let config = match fetched {
            Ok(config) if config.has_api_key() => config,
            Ok(_) => {
                self.set_state(&mut inner, SessionState::Uninitialized);
                let err = SessionError::Configuration("API key not configured".to_string());
                return Err(self.reject(err));
            }
            Err(err) => {
                self.set_state(&mut inner, SessionState::Uninitialized);
                return Err(self.reject(SessionError::ConfigFetch(err)));
            }
        };

        inner.config = Some(config);
        let system_turn = Turn::system(self.system_context());
        if inner.transcript.insert_system_context(system_turn.clone()) {
            self.events.turn_added(&system_turn);
        }
        self.set_state(&mut inner, SessionState::Ready);
        debug!(user = %self.user, "session initialized");
        Ok(SessionState::Ready)
    }

    /// Submit a user message and wait for the reply.
    ///
    /// Rejected outright (no transcript mutation) when the text trims to
    /// empty or the session is not `Ready`; a second call while a response
    /// is in flight gets `NotReady` rather than being queued.
    pub async fn submit(&self, text: &str) -> Result<String, SessionError> {
        let text = text.trim();

        let (snapshot, config) = {
            let mut inner = self.inner.lock().await;
            match inner.state {
                SessionState::Closed => {
                    return Err(self.reject(SessionError::SessionClosed));
                }
                SessionState::Ready => {}
                state => return Err(self.reject(SessionError::NotReady(state))),
            }
            if text.is_empty() {
                return Err(self.reject(SessionError::InvalidRequest));
            }
            let Some(config) = inner.config.clone() else {
                let err = SessionError::Configuration("session config missing".to_string());
                return Err(self.reject(err));
            };

            let user_turn = Turn::user(text);
            inner.transcript.append(user_turn.clone());
            self.events.turn_added(&user_turn);
            self.set_state(&mut inner, SessionState::AwaitingResponse);
            if inner.transcript.push_pending().is_some() {
                if let Some(turn) = inner.transcript.last() {
                    self.events.turn_added(turn);
                }
            }
            (inner.transcript.snapshot(), config)
        };

        let outcome = tokio::select! {
            result = self.generator.generate(&snapshot, &config) => Some(result),
            _ = self.cancel_token.cancelled() => None,
        };

        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Closed {
            // Closed while the generation was in flight; the result, if it
            // arrived, is discarded without touching the transcript.
            return Err(SessionError::SessionClosed);
        }
        let Some(outcome) = outcome else {
            return Err(SessionError::SessionClosed);
        };

        if let Some(index) = inner.transcript.remove_pending() {
            self.events.turn_removed(index);
        }

        match outcome {
            Ok(reply) => {
                let turn = Turn::assistant(reply.clone());
                inner.transcript.append(turn.clone());
                self.events.turn_added(&turn);
                self.set_state(&mut inner, SessionState::Ready);
                Ok(reply)
            }
            Err(err) => {
                warn!(error = %err, "generation failed");
                let turn = Turn::error(GENERATION_FAILURE_NOTICE);
                inner.transcript.append(turn.clone());
                self.events.turn_added(&turn);
                self.set_state(&mut inner, SessionState::Ready);
                Err(SessionError::Generation(err))
            }
        }
    }

    /// Empty the transcript. Allowed in any state; the state machine is
    /// untouched.
    ///
    /// Removals are announced last-to-first so an event-mirroring UI can
    /// apply them as repeated tail removals.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        let len = inner.transcript.len();
        inner.transcript.clear();
        for index in (0..len).rev() {
            self.events.turn_removed(index);
        }
    }

    /// Close the session. Idempotent; cancels any in-flight work and drops
    /// a lingering pending placeholder.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Closed {
            return;
        }
        if let Some(index) = inner.transcript.remove_pending() {
            self.events.turn_removed(index);
        }
        self.set_state(&mut inner, SessionState::Closed);
        self.cancel_token.cancel();
        debug!(user = %self.user, "session closed");
    }

    fn set_state(&self, inner: &mut SessionInner, state: SessionState) {
        inner.state = state;
        self.events.state_changed(state);
    }

    /// Guard rejections surface on the event channel too, so a UI driving
    /// the session from spawned tasks sees them without plumbing results.
    fn reject(&self, err: SessionError) -> SessionError {
        self.events.error(err.kind(), err.to_string());
        err
    }

    fn system_context(&self) -> String {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!(
            "You are Airi, an airline virtual assistant. Current time: {now}\n\
             Current user: {user}\n\
             Instructions:\n\
             - Be concise and professional in responses\n\
             - Provide specific flight-related information when asked\n\
             - Maintain a helpful and friendly tone\n\
             - If unsure, acknowledge and ask for clarification",
            user = self.user
        )
    }
}
