use crate::advice::PROVIDER_FALLBACK;
use crate::models::ChatMessage;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, MutexGuard,
};

pub const GREETING: &str =
    "Hi! I'm your AI health coach. Based on your activity today, would you like some tips for optimization?";

#[derive(Debug, PartialEq, Eq)]
pub enum TurnRejected {
    Blank,
    Pending,
}

/// Transcript of the coach conversation plus the single in-flight turn.
///
/// Messages are append-only. At most one turn is outstanding at a time, and
/// every accepted user message is followed by exactly one assistant message.
#[derive(Debug)]
pub struct ChatSession {
    messages: Mutex<Vec<ChatMessage>>,
    pending: AtomicBool,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(vec![ChatMessage::assistant(GREETING)]),
            pending: AtomicBool::new(false),
        }
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Starts a turn for `text`, appending it as the user message.
    pub fn begin_turn(self: &Arc<Self>, text: &str) -> Result<TurnGuard, TurnRejected> {
        if text.trim().is_empty() {
            return Err(TurnRejected::Blank);
        }
        if self
            .pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(TurnRejected::Pending);
        }

        self.lock().push(ChatMessage::user(text));
        Ok(TurnGuard {
            session: Arc::clone(self),
            answered: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The outstanding turn. Dropping it without [`finish`](Self::finish) answers
/// with [`PROVIDER_FALLBACK`].
#[must_use = "dropping the guard answers the turn with the fallback reply"]
pub struct TurnGuard {
    session: Arc<ChatSession>,
    answered: bool,
}

impl TurnGuard {
    pub fn finish(mut self, reply: impl Into<String>) {
        self.session.lock().push(ChatMessage::assistant(reply));
        self.answered = true;
    }
}

impl Drop for TurnGuard {
    fn drop(&mut self) {
        if !self.answered {
            self.session
                .lock()
                .push(ChatMessage::assistant(PROVIDER_FALLBACK));
        }
        self.session.pending.store(false, Ordering::SeqCst);
    }
}
