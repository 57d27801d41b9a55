use crate::core::message::{Turn, TurnRole};

/// Append-only ordered log of [`Turn`]s for one session.
///
/// Invariants:
/// - turns are totally ordered by insertion;
/// - at most one pending turn exists, and it is always the last element;
/// - turns are immutable once appended (the pending placeholder is removed,
///   never edited in place).
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
    has_system_context: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Insert the system-context turn at the head of the transcript. Allowed
    /// at most once; returns false without mutating if already present.
    pub fn insert_system_context(&mut self, turn: Turn) -> bool {
        if self.has_system_context {
            return false;
        }
        debug_assert!(turn.role == TurnRole::System);
        self.turns.insert(0, turn);
        self.has_system_context = true;
        true
    }

    /// Append a turn and return its index. The caller must have removed any
    /// pending placeholder first.
    pub fn append(&mut self, turn: Turn) -> usize {
        debug_assert!(!self.last_is_pending());
        self.turns.push(turn);
        self.turns.len() - 1
    }

    /// Append the typing placeholder and return its index. No-op returning
    /// `None` if a pending turn already exists.
    pub fn push_pending(&mut self) -> Option<usize> {
        if self.last_is_pending() {
            return None;
        }
        self.turns.push(Turn::pending());
        Some(self.turns.len() - 1)
    }

    /// Remove the trailing pending placeholder, if any, and return its former
    /// index. This is the only removal the transcript supports.
    pub fn remove_pending(&mut self) -> Option<usize> {
        if self.last_is_pending() {
            self.turns.pop();
            Some(self.turns.len())
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
        self.has_system_context = false;
    }

    /// Owned copy of the current turns, handed to response generators so
    /// they can never mutate session state.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    fn last_is_pending(&self) -> bool {
        self.turns.last().map(Turn::is_pending).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::TurnStatus;

    #[test]
    fn system_context_inserts_at_head_once() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("hello"));
        assert!(transcript.insert_system_context(Turn::system("context")));
        assert!(!transcript.insert_system_context(Turn::system("again")));
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[0].role, TurnRole::System);
        assert_eq!(transcript.turns()[0].content, "context");
    }

    #[test]
    fn at_most_one_pending_turn() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.push_pending(), Some(0));
        assert_eq!(transcript.push_pending(), None);
        assert_eq!(transcript.len(), 1);
    }

    #[test]
    fn remove_pending_only_removes_the_placeholder() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("hi"));
        assert_eq!(transcript.remove_pending(), None);
        assert_eq!(transcript.push_pending(), Some(1));
        assert_eq!(transcript.remove_pending(), Some(1));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].status, TurnStatus::Normal);
    }

    #[test]
    fn clear_resets_the_system_context_slot() {
        let mut transcript = Transcript::new();
        transcript.insert_system_context(Turn::system("context"));
        transcript.clear();
        assert!(transcript.is_empty());
        assert!(transcript.insert_system_context(Turn::system("context")));
    }

    #[test]
    fn snapshot_is_detached_from_the_transcript() {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user("hi"));
        let snapshot = transcript.snapshot();
        transcript.append(Turn::assistant("hello"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(transcript.len(), 2);
    }
}
