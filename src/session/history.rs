use crate::llm::{Message, Role};

/// Ordered message history for one session.
///
/// Append-only during normal operation; entries are added as complete
/// (human, assistant) turn pairs once a turn has fully succeeded, so a
/// failed turn never leaves an orphaned human entry behind.
#[derive(Debug, Default, Clone)]
pub struct ChatHistory {
    messages: Vec<Message>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Record one completed turn.
    pub fn push_turn(&mut self, input: impl Into<String>, answer: impl Into<String>) {
        self.messages.push(Message::human(input));
        self.messages.push(Message::assistant(answer));
    }

    /// Number of completed (human, assistant) turns.
    pub fn turn_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Human)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_turn_appends_pair_in_order() {
        let mut history = ChatHistory::new();
        history.push_turn("question", "answer");

        assert_eq!(history.len(), 2);
        assert_eq!(history.messages()[0].role, Role::Human);
        assert_eq!(history.messages()[1].role, Role::Assistant);
        assert_eq!(history.turn_count(), 1);
    }

    #[test]
    fn test_alternation_over_many_turns() {
        let mut history = ChatHistory::new();
        for i in 0..5 {
            history.push_turn(format!("q{}", i), format!("a{}", i));
        }

        assert_eq!(history.len(), 10);
        for (i, msg) in history.messages().iter().enumerate() {
            let expected = if i % 2 == 0 { Role::Human } else { Role::Assistant };
            assert_eq!(msg.role, expected);
        }
    }
}
