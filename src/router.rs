use rand::seq::SliceRandom;
use tracing::debug;

use crate::backend::CompletionBackend;
use crate::conversation::{ConversationStore, system_turn};
use crate::model::{Message, RemoteError};

pub const EMPTY_INPUT_PROMPT: &str = "Please enter a question or type 'exit' to quit.";

pub const HELP_TEXT: &str = "Available quick commands:\n\
      help       - Show this list\n\
      policies   - List common policy types\n\
      claims     - Outline standard claim steps\n\
      coverage   - Summarize standard coverage\n\
      exit/quit  - End the session";

const POLICIES_TEXT: &str = "Common policy types include:\n\
    - Auto Insurance\n\
    - Homeowners Insurance\n\
    - Life Insurance\n\
    - Health Insurance\n\
    - Commercial Property Insurance";

const CLAIMS_TEXT: &str = "Typical claim process:\n\
    1. Report the incident promptly.\n\
    2. Provide necessary documentation (photos, police reports, etc.).\n\
    3. An adjuster reviews and investigates the claim.\n\
    4. Receive settlement or explanation of coverage.";

const COVERAGE_TEXT: &str = "Standard coverage often includes:\n\
    - Liability protection\n\
    - Property damage coverage\n\
    - Personal injury protection\n\
    - Optional add-ons such as roadside assistance or rental reimbursement.";

const GREETINGS: &[&str] = &[
    "Hello! How can I help with your insurance questions today?",
    "Hi there! Ask me anything about policies, claims, or coverage.",
    "Welcome! What insurance topic can I walk you through?",
];

const FAREWELLS: &[&str] = &[
    "Goodbye! Feel free to come back with more insurance questions.",
    "Take care! I'm here whenever you need policy or claims help.",
    "Bye for now. Stay covered!",
];

/// Deterministic keyword shortcuts answered without touching the model.
/// Keys are matched against the normalized input; multi-entry values get
/// one variant picked at random.
const QUICK_COMMANDS: &[(&str, &[&str])] = &[
    ("help", &[HELP_TEXT]),
    ("policies", &[POLICIES_TEXT]),
    ("claims", &[CLAIMS_TEXT]),
    ("coverage", &[COVERAGE_TEXT]),
    ("hello", GREETINGS),
    ("bye", FAREWELLS),
];

fn quick_reply(normalized: &str) -> Option<String> {
    let (_, replies) = QUICK_COMMANDS
        .iter()
        .find(|(key, _)| *key == normalized)?;
    replies
        .choose(&mut rand::thread_rng())
        .map(|reply| (*reply).to_string())
}

/// What the session loop should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Exit,
    CannedReply(String),
    DelegatedReply(String),
}

/// Routes one line of input. First match wins: empty prompt, exit words,
/// quick commands, then delegation to the completion backend. The store is
/// only mutated after a delegated call succeeds.
pub async fn handle(
    backend: &impl CompletionBackend,
    store: &mut ConversationStore,
    role_label: &str,
    raw_text: &str,
) -> Result<Outcome, RemoteError> {
    let trimmed = raw_text.trim();
    let normalized = trimmed.to_ascii_lowercase();

    if normalized.is_empty() {
        return Ok(Outcome::CannedReply(EMPTY_INPUT_PROMPT.to_string()));
    }

    if normalized == "exit" || normalized == "quit" {
        return Ok(Outcome::Exit);
    }

    if let Some(reply) = quick_reply(&normalized) {
        debug!(command = %normalized, "answered by quick command");
        return Ok(Outcome::CannedReply(reply));
    }

    let mut payload: Vec<Message> = Vec::with_capacity(store.len() + 2);
    payload.push(system_turn(role_label));
    payload.extend_from_slice(store.turns());
    payload.push(Message::user(trimmed));

    let reply = backend.complete(&payload).await?;
    store.append_exchange(trimmed, reply.clone());
    debug!(history_len = store.len(), "delegated exchange recorded");
    Ok(Outcome::DelegatedReply(reply))
}

#[cfg(test)]
mod tests {
    use super::{EMPTY_INPUT_PROMPT, FAREWELLS, GREETINGS, HELP_TEXT, Outcome, handle};
    use crate::backend::{CompletionBackend, CompletionFuture};
    use crate::conversation::ConversationStore;
    use crate::model::{Message, MessageRole, RemoteError, RemoteErrorKind};
    use std::cell::RefCell;

    /// Records every payload it receives; replies with a fixed string or
    /// fails, depending on `fail`.
    struct FakeBackend {
        reply: String,
        fail: bool,
        calls: RefCell<Vec<Vec<Message>>>,
    }

    impl FakeBackend {
        fn replying(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                fail: false,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: String::new(),
                fail: true,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }
    }

    impl CompletionBackend for FakeBackend {
        fn complete<'a>(&'a self, messages: &'a [Message]) -> CompletionFuture<'a> {
            self.calls.borrow_mut().push(messages.to_vec());
            Box::pin(async move {
                if self.fail {
                    Err(RemoteError::new(
                        RemoteErrorKind::RateLimited,
                        "status 429",
                    ))
                } else {
                    Ok(self.reply.clone())
                }
            })
        }
    }

    #[tokio::test]
    async fn empty_input_prompts_without_calling_the_backend() {
        let backend = FakeBackend::replying("unused");
        let mut store = ConversationStore::new();

        let outcome = handle(&backend, &mut store, "agent", "   \t  ")
            .await
            .expect("local outcome");

        assert_eq!(outcome, Outcome::CannedReply(EMPTY_INPUT_PROMPT.to_string()));
        assert_eq!(backend.call_count(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn exit_and_quit_end_the_session_in_any_case() {
        let backend = FakeBackend::replying("unused");
        let mut store = ConversationStore::new();

        for word in ["exit", "QUIT", " Exit "] {
            let outcome = handle(&backend, &mut store, "agent", word)
                .await
                .expect("local outcome");
            assert_eq!(outcome, Outcome::Exit, "word: {word}");
        }
        assert_eq!(backend.call_count(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn help_returns_the_fixed_summary_and_leaves_the_store_alone() {
        let backend = FakeBackend::replying("unused");
        let mut store = ConversationStore::new();
        store.append_exchange("earlier q", "earlier a");
        let len_before = store.len();

        let outcome = handle(&backend, &mut store, "agent", " HELP ")
            .await
            .expect("local outcome");

        assert_eq!(outcome, Outcome::CannedReply(HELP_TEXT.to_string()));
        assert_eq!(store.len(), len_before);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn greeting_keywords_pick_from_the_canned_set() {
        let backend = FakeBackend::replying("unused");
        let mut store = ConversationStore::new();

        let outcome = handle(&backend, &mut store, "agent", "Hello")
            .await
            .expect("local outcome");
        match outcome {
            Outcome::CannedReply(text) => {
                assert!(GREETINGS.contains(&text.as_str()), "unexpected: {text}")
            }
            other => panic!("expected canned reply, got {other:?}"),
        }

        let outcome = handle(&backend, &mut store, "agent", "BYE")
            .await
            .expect("local outcome");
        match outcome {
            Outcome::CannedReply(text) => {
                assert!(FAREWELLS.contains(&text.as_str()), "unexpected: {text}")
            }
            other => panic!("expected canned reply, got {other:?}"),
        }

        assert_eq!(backend.call_count(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delegation_appends_user_then_assistant_with_original_casing() {
        let backend = FakeBackend::replying("Liability covers damage you cause to others.");
        let mut store = ConversationStore::new();

        let outcome = handle(&backend, &mut store, "agent", "What is Liability Coverage?")
            .await
            .expect("delegated outcome");

        assert_eq!(
            outcome,
            Outcome::DelegatedReply("Liability covers damage you cause to others.".to_string())
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.turns()[0].role, MessageRole::User);
        assert_eq!(store.turns()[0].content, "What is Liability Coverage?");
        assert_eq!(store.turns()[1].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn second_delegation_replays_full_history_after_the_system_turn() {
        let backend = FakeBackend::replying("answer");
        let mut store = ConversationStore::new();

        handle(&backend, &mut store, "agent", "What is liability coverage?")
            .await
            .expect("first exchange");
        handle(&backend, &mut store, "agent", "And for homes?")
            .await
            .expect("second exchange");

        let calls = backend.calls.borrow();
        let payload = &calls[1];
        assert_eq!(payload.len(), 4);
        assert_eq!(payload[0].role, MessageRole::System);
        assert!(payload[0].content.contains("assisting a agent"));
        assert_eq!(payload[1].content, "What is liability coverage?");
        assert_eq!(payload[2].content, "answer");
        assert_eq!(payload[3].content, "And for homes?");
    }

    #[tokio::test]
    async fn failed_delegation_leaves_the_store_unchanged() {
        let backend = FakeBackend::failing();
        let mut store = ConversationStore::new();
        store.append_exchange("earlier q", "earlier a");

        let err = handle(&backend, &mut store, "agent", "new question")
            .await
            .expect_err("backend failure should surface");

        assert_eq!(err.kind, RemoteErrorKind::RateLimited);
        assert_eq!(store.len(), 2);
        assert_eq!(backend.call_count(), 1);
    }
}
