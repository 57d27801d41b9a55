use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TurnRole {
    User,
    Assistant,
    System,
}

impl TurnRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
            TurnRole::System => "system",
        }
    }

    pub fn is_user(self) -> bool {
        self == TurnRole::User
    }

    pub fn is_assistant(self) -> bool {
        self == TurnRole::Assistant
    }

    pub fn is_system(self) -> bool {
        self == TurnRole::System
    }
}

impl AsRef<str> for TurnRole {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl TryFrom<&str> for TurnRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            "system" => Ok(TurnRole::System),
            _ => Err(format!("invalid turn role: {value}")),
        }
    }
}

impl TryFrom<String> for TurnRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TurnRole> for String {
    fn from(value: TurnRole) -> Self {
        value.as_str().to_string()
    }
}

/// Delivery status of a turn.
///
/// `Pending` marks the transient typing placeholder; it is never persisted
/// as `Normal` and at most one turn carries it at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    Normal,
    Pending,
    Error,
}

/// One message unit in a conversation.
///
/// `created_at` is display-only; transcript ordering is by insertion, never
/// by timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
    pub status: TurnStatus,
    pub created_at: DateTime<Local>,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            status: TurnStatus::Normal,
            created_at: Local::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    /// The typing placeholder shown while a response is in flight.
    pub fn pending() -> Self {
        Self {
            status: TurnStatus::Pending,
            ..Self::new(TurnRole::Assistant, "")
        }
    }

    /// An assistant-authored turn recording a failed generation. `content`
    /// must already be user-safe copy, not backend detail.
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            status: TurnStatus::Error,
            ..Self::new(TurnRole::Assistant, content)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TurnStatus::Pending
    }

    pub fn is_error(&self) -> bool {
        self.status == TurnStatus::Error
    }

    pub fn formatted_time(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_strings_round_trip() {
        for role in [TurnRole::User, TurnRole::Assistant, TurnRole::System] {
            assert_eq!(TurnRole::try_from(role.as_str()), Ok(role));
        }
    }

    #[test]
    fn invalid_role_strings_are_rejected() {
        assert!(TurnRole::try_from("bot").is_err());
        assert!(TurnRole::try_from("").is_err());
    }

    #[test]
    fn pending_placeholder_is_an_empty_assistant_turn() {
        let turn = Turn::pending();
        assert!(turn.is_pending());
        assert_eq!(turn.role, TurnRole::Assistant);
        assert!(turn.content.is_empty());
    }

    #[test]
    fn error_turns_keep_their_copy() {
        let turn = Turn::error("something went wrong");
        assert!(turn.is_error());
        assert_eq!(turn.content, "something went wrong");
    }
}
