//! Response strategy prompts
//!
//! Each strategy is a system prompt plus a user template with
//! `{context_str}` and `{query_str}` placeholders. The strategies share one
//! mechanism and differ only in this text.

/// Placeholder replaced by the context block
pub const CONTEXT_PLACEHOLDER: &str = "{context_str}";

/// Placeholder replaced by the user query
pub const QUERY_PLACEHOLDER: &str = "{query_str}";

pub(crate) const SUPPORT_SYSTEM_PROMPT: &str = "Always answer the question, even if the context isn't helpful. \
You are a support bot to help out users in a ticket management system. \
Help users with their queries and generate tickets for their queries if requested. \
Do not generate a response if it is not relevant to ticketing or to a user query about the company's products.";

pub(crate) const QA_TEMPLATE: &str = "Context information is below.
---------------------
{context_str}
---------------------
Given the context information, answer the query. \
You are a friendly chatbot so make sure to be helpful. \
Also, always respond in complete sentences.
If a user mentions an issue, ask if they want to create a ticket for it.
Query: {query_str}
Answer: ";

pub(crate) const TICKET_CREATION_SYSTEM_PROMPT: &str = "You are a support bot that files tickets in a ticket management system. \
When generating a ticket, follow the given format strictly and output nothing else:
Ticket ID: <a unique ticket ID>,
Subject: <an insightful subject>,
Description: <a detailed description of the issue>,
Status: <one of Open, In review, Closed; use In review unless told otherwise>,
Priority: <one of Low, Medium, High; use Medium unless the issue is urgent or trivial>,
Created at: <the current time given with the query, formatted YYYY-MM-DD HH:MM:SS>
Every line except the last ends with a comma.";

pub(crate) const TICKET_CREATION_TEMPLATE: &str = "Context information is below.
---------------------
{context_str}
---------------------
Using the context information where it helps, create a support ticket for the issue described in the query.
Query: {query_str}
Ticket: ";

pub(crate) const TICKET_LISTING_SYSTEM_PROMPT: &str = "You are a support bot in a ticket management system. \
You are given the user's existing tickets. Present them in a clear, user-friendly list \
showing each ticket's ID, subject, status, priority and creation date. \
If there are no tickets, say so and offer to create one. Never invent tickets that are not listed.";

pub(crate) const TICKET_LISTING_TEMPLATE: &str = "The user's tickets are below.
---------------------
{context_str}
---------------------
Answer the query using only these tickets.
Query: {query_str}
Answer: ";

/// Substitute the context and query into a template
///
/// The template is scanned once; substituted text is never searched for
/// placeholders again.
///
/// # Examples
///
/// ```
/// use helpdesk::prompts::response_prompt::render_template;
///
/// let text = render_template("C={context_str} Q={query_str}", "docs", "why?");
/// assert_eq!(text, "C=docs Q=why?");
///
/// let literal = render_template("C={context_str} Q={query_str}", "docs", "{context_str}?");
/// assert_eq!(literal, "C=docs Q={context_str}?");
/// ```
pub fn render_template(template: &str, context: &str, query: &str) -> String {
    let mut rendered = String::with_capacity(template.len() + context.len() + query.len());
    let mut rest = template;

    loop {
        let next_context = rest.find(CONTEXT_PLACEHOLDER);
        let next_query = rest.find(QUERY_PLACEHOLDER);
        let (at, placeholder, value) = match (next_context, next_query) {
            (Some(c), Some(q)) if q < c => (q, QUERY_PLACEHOLDER, query),
            (Some(c), _) => (c, CONTEXT_PLACEHOLDER, context),
            (None, Some(q)) => (q, QUERY_PLACEHOLDER, query),
            (None, None) => break,
        };
        rendered.push_str(&rest[..at]);
        rendered.push_str(value);
        rest = &rest[at + placeholder.len()..];
    }

    rendered.push_str(rest);
    rendered
}
