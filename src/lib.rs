//! Airi-session is the UI-agnostic conversation core of the Airi airline
//! assistant.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the session state machine, the transcript, the typed
//!   error taxonomy, the event surface, and configuration sourcing.
//! - [`generator`] defines the pluggable response-generator seam and ships
//!   an HTTP implementation for chat-completion style endpoints.
//! - [`api`] defines the wire payloads used by the HTTP generator and the
//!   remote parameter document.
//!
//! A UI embeds the core by constructing a [`core::session::ChatSession`]
//! with a [`core::config::ConfigSource`] and a
//! [`generator::ResponseGenerator`], then draining the
//! [`core::events::SessionEvent`] receiver to drive its display.

pub mod api;
pub mod core;
pub mod generator;
