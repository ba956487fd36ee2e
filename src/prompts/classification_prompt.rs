//! Intent classification prompts
//!
//! Both templates ask for a bare label on a single line. The classifier
//! tolerates extra text around the label, so the wording here only needs
//! to make the label likely, not guaranteed.

/// Placeholder replaced by the user query
pub const QUESTION_PLACEHOLDER: &str = "{question}";

const TICKET_CLASSIFICATION_TEMPLATE: &str = r#"Your job is to classify queries sent to a customer support desk. Given a user question below, classify it as belonging to either "Create_Ticket", "Retrieve_Ticket" or "Generic".

<If the user asks to open, raise, file, log or create a ticket for an issue, classify the question as "Create_Ticket".>

<If the user asks to see, list, check or look up their existing tickets or the status of a ticket, classify the question as "Retrieve_Ticket".>

<If the user query is about any other subject or topic, classify the question as "Generic".>

Respond with the label only.

<question>
{question}
</question>

Classification:"#;

const ACTION_CLASSIFICATION_TEMPLATE: &str = r#"Your job is to classify queries. Given a user question below, classify it as belonging to either "Get_Time", "Get_Stock_Price", "Send_Whatsapp_Message" or "Miscellaneous".

<If the user query is about the current time in any country, then classify the question as "Get_Time". The response should be of the format "Get_Time,IANA" where IANA is a valid time zone from the IANA Time Zone Database like "America/New_York" or "Europe/London". If the country isn't mentioned assume it to be India.>

<If the user query is about the stock price of a share of any company in the market, then classify the question as "Get_Stock_Price". The response should be of the format "Get_Stock_Price,Symbol" where Symbol is the ticker symbol of the concerned company.>

<If the user query is about sending a whatsapp message to a particular user, then classify the question as "Send_Whatsapp_Message". The response should be in the format "Send_Whatsapp_Message,Name,Message" where Name is the name of the person mentioned and Message is the message to be sent, taken from the user's query word for word.>

<If the user query is about any other subject or topic, classify the question as "Miscellaneous".>

<question>
{question}
</question>

Classification:"#;

/// Render the ticket-lifecycle classification prompt for a query
///
/// # Examples
///
/// ```
/// use helpdesk::prompts::classification_prompt::ticket_classification_prompt;
///
/// let prompt = ticket_classification_prompt("Show me my tickets");
/// assert!(prompt.contains("Show me my tickets"));
/// assert!(prompt.contains("Retrieve_Ticket"));
/// ```
pub fn ticket_classification_prompt(query: &str) -> String {
    TICKET_CLASSIFICATION_TEMPLATE.replace(QUESTION_PLACEHOLDER, query)
}

/// Render the action classification prompt for a query
pub fn action_classification_prompt(query: &str) -> String {
    ACTION_CLASSIFICATION_TEMPLATE.replace(QUESTION_PLACEHOLDER, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_prompt_lists_every_label() {
        let prompt = ticket_classification_prompt("hello");
        for label in ["Create_Ticket", "Retrieve_Ticket", "Generic"] {
            assert!(prompt.contains(label), "missing {}", label);
        }
        assert!(!prompt.contains(QUESTION_PLACEHOLDER));
    }

    #[test]
    fn test_action_prompt_describes_argument_format() {
        let prompt = action_classification_prompt("what time is it");
        assert!(prompt.contains("Get_Time,IANA"));
        assert!(prompt.contains("Send_Whatsapp_Message,Name,Message"));
        assert!(prompt.contains("what time is it"));
    }
}
