//! Conversation memory with token-budget eviction
//!
//! Prior turns are replayed to the completion service so follow-up
//! questions have context. The window is bounded by an estimated token
//! budget; the oldest turns go first.

pub mod session;

pub use session::SessionMemoryStore;

use crate::providers::Message;

/// Information about the current memory window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextInfo {
    /// Token budget of the window
    pub max_tokens: usize,
    /// Estimated tokens currently held
    pub used_tokens: usize,
    /// Tokens left before eviction starts
    pub remaining_tokens: usize,
    /// Percentage of the budget used (0.0-100.0)
    pub percentage_used: f64,
}

impl ContextInfo {
    /// Create a new ContextInfo instance
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::memory::ContextInfo;
    ///
    /// let info = ContextInfo::new(3000, 750);
    /// assert_eq!(info.remaining_tokens, 2250);
    /// assert_eq!(info.percentage_used, 25.0);
    /// ```
    pub fn new(max_tokens: usize, used_tokens: usize) -> Self {
        let remaining_tokens = max_tokens.saturating_sub(used_tokens);
        let percentage_used = if max_tokens == 0 {
            0.0
        } else {
            (used_tokens.min(max_tokens) as f64 / max_tokens as f64) * 100.0
        };

        Self {
            max_tokens,
            used_tokens,
            remaining_tokens,
            percentage_used,
        }
    }
}

/// Estimate the token count of a text
///
/// Uses characters / 4 rounded up, which approximates GPT-style tokenizers
/// for English text.
pub fn estimate_tokens(text: &str) -> usize {
    (text.chars().count() + 3) / 4
}

fn message_tokens(message: &Message) -> usize {
    estimate_tokens(&message.content)
}

/// Drop turns from the front until the total fits `budget`
///
/// The most recent turn is always kept, even when it alone exceeds the
/// budget. Returns the number of evicted turns.
///
/// # Examples
///
/// ```
/// use helpdesk::memory::evict_to_budget;
/// use helpdesk::providers::Message;
///
/// let mut turns = vec![
///     Message::user("a".repeat(40)),
///     Message::assistant("b".repeat(40)),
///     Message::user("c".repeat(40)),
/// ];
/// let evicted = evict_to_budget(&mut turns, 25);
/// assert_eq!(evicted, 1);
/// assert_eq!(turns.len(), 2);
/// ```
pub fn evict_to_budget(turns: &mut Vec<Message>, budget: usize) -> usize {
    let mut total: usize = turns.iter().map(message_tokens).sum();
    let mut evict = 0;
    while total > budget && evict + 1 < turns.len() {
        total -= message_tokens(&turns[evict]);
        evict += 1;
    }
    turns.drain(..evict);
    evict
}

/// Rolling window of conversation turns bounded by a token budget
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: Vec<Message>,
    token_limit: usize,
    token_count: usize,
}

impl ConversationMemory {
    /// Create an empty memory with the given token budget
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::memory::ConversationMemory;
    ///
    /// let mut memory = ConversationMemory::new(3000);
    /// memory.push("user", "My VPN keeps dropping");
    /// assert_eq!(memory.len(), 1);
    /// assert_eq!(memory.token_count(), 6);
    /// ```
    pub fn new(token_limit: usize) -> Self {
        Self {
            turns: Vec::new(),
            token_limit,
            token_count: 0,
        }
    }

    /// Append a turn and evict old turns if over budget
    pub fn push(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.push_message(Message {
            role: role.into(),
            content: content.into(),
        });
    }

    /// Append a message and evict old turns if over budget
    pub fn push_message(&mut self, message: Message) {
        self.token_count += message_tokens(&message);
        self.turns.push(message);

        let evicted = evict_to_budget(&mut self.turns, self.token_limit);
        if evicted > 0 {
            self.token_count = self.turns.iter().map(message_tokens).sum();
            tracing::debug!(
                "Evicted {} turns from memory, {} tokens retained",
                evicted,
                self.token_count
            );
        }
    }

    /// Turns currently in the window, oldest first
    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    /// Estimated tokens held
    pub fn token_count(&self) -> usize {
        self.token_count
    }

    /// Token budget
    pub fn token_limit(&self) -> usize {
        self.token_limit
    }

    /// Number of turns held
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns are held
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Remove every turn
    pub fn clear(&mut self) {
        self.turns.clear();
        self.token_count = 0;
    }

    /// Budget usage snapshot
    pub fn context_info(&self) -> ContextInfo {
        ContextInfo::new(self.token_limit, self.token_count)
    }
}
