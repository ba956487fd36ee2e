//! Response strategy execution
//!
//! Every strategy is one completion call over the same message layout:
//! the strategy's system prompt, the session's prior turns, then the user
//! template rendered with the context block and the query.

use crate::error::{with_timeout, Result};
use crate::prompts::ResponseStrategy;
use crate::providers::{Message, Provider};

/// Assemble the messages for one strategy call
///
/// # Examples
///
/// ```
/// use helpdesk::prompts::ResponseStrategy;
/// use helpdesk::providers::Message;
/// use helpdesk::router::strategy::build_messages;
///
/// let history = vec![Message::user("hi"), Message::assistant("hello")];
/// let messages = build_messages(ResponseStrategy::PlainAnswer, "ctx", &history, "why?");
/// assert_eq!(messages.len(), 4);
/// assert_eq!(messages[0].role, "system");
/// assert!(messages[3].content.contains("why?"));
/// ```
pub fn build_messages(
    strategy: ResponseStrategy,
    context: &str,
    history: &[Message],
    query: &str,
) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(strategy.system_prompt()));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(strategy.render(context, query)));
    messages
}

/// Run a strategy against the completion provider
///
/// # Errors
///
/// Returns error if the completion fails or exceeds `timeout_seconds`
pub async fn respond(
    provider: &dyn Provider,
    strategy: ResponseStrategy,
    context: &str,
    history: &[Message],
    query: &str,
    timeout_seconds: u64,
) -> Result<String> {
    let messages = build_messages(strategy, context, history, query);
    tracing::debug!(
        strategy = %strategy,
        messages = messages.len(),
        prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>(),
        "Requesting completion"
    );

    let response = with_timeout("completion", timeout_seconds, provider.complete(&messages)).await?;
    if let Some(usage) = response.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "Completion usage"
        );
    }
    Ok(response.message.content)
}
