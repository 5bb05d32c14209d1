use crate::model::Message;

/// Ordered transcript of one interactive session. Quick-command replies
/// never land here; only delegated exchanges do.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed exchange: the user turn, then the assistant
    /// turn. Callers must only do this after the remote call succeeded.
    pub fn append_exchange(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
    ) {
        self.turns.push(Message::user(user_text));
        self.turns.push(Message::assistant(assistant_text));
    }

    /// Chronological turns for replay. The system turn is not stored;
    /// see [`system_turn`].
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The fixed guidance message prepended to every remote call. Kept out of
/// the store so it appears exactly once per payload.
pub fn system_turn(role_label: &str) -> Message {
    Message::system(format!(
        "You are an AI assistant for an insurance company. \
         You are currently assisting a {role_label}. \
         Answer questions in a friendly, professional, clear, and helpful manner. \
         Provide accurate and ethical information about claims, policy details, \
         and quotes, but never access or request personal data. \
         Maintain context across multiple messages in this conversation."
    ))
}
