//! Action intent parsing
//!
//! A second classifier prompt labels queries as time, stock price or
//! messaging requests, with positional arguments in a comma-separated reply
//! such as `Send_Whatsapp_Message,Ravi,See you at 5`.

use crate::classifier::normalize_output;
use crate::error::{HelpdeskError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Time zone assumed when a time query names no place
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Action requested by a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionIntent {
    /// Current time in an IANA time zone
    GetTime {
        /// IANA zone name, e.g. `Europe/London`
        timezone: String,
    },
    /// Latest share price of a company
    GetStockPrice {
        /// Ticker symbol
        symbol: String,
    },
    /// Send a message to a contact
    SendMessage {
        /// Contact name as written in the query
        contact: String,
        /// Message body, verbatim
        message: String,
    },
    /// Anything else
    Miscellaneous,
}

#[derive(Clone, Copy)]
enum ActionLabel {
    GetTime,
    GetStockPrice,
    SendMessage,
}

const ACTION_LABELS: [(ActionLabel, &str); 3] = [
    (ActionLabel::SendMessage, "send_whatsapp_message"),
    (ActionLabel::GetStockPrice, "get_stock_price"),
    (ActionLabel::GetTime, "get_time"),
];

/// Map action classifier output to an action intent
///
/// Labels are matched case-insensitively. A labelled intent whose required
/// arguments are missing becomes `Miscellaneous`.
///
/// # Examples
///
/// ```
/// use helpdesk::classifier::{parse_action, ActionIntent};
///
/// assert_eq!(
///     parse_action("Get_Time,Europe/London"),
///     ActionIntent::GetTime { timezone: "Europe/London".into() }
/// );
/// assert_eq!(parse_action("Get_Stock_Price"), ActionIntent::Miscellaneous);
/// ```
pub fn parse_action(output: &str) -> ActionIntent {
    let line = output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default();
    let normalized = normalize_output(line);

    for (label, text) in ACTION_LABELS {
        // Normalisation preserves byte offsets.
        let Some(start) = normalized.find(text) else {
            continue;
        };
        let rest = line.get(start + text.len()..).unwrap_or_default();
        let rest = rest.trim_start_matches(|c: char| c == '"' || c == '\'' || c.is_whitespace());
        let rest = rest.strip_prefix(',').unwrap_or(rest);
        return build_action(label, rest);
    }

    ActionIntent::Miscellaneous
}

fn build_action(label: ActionLabel, args: &str) -> ActionIntent {
    match label {
        ActionLabel::GetTime => {
            let timezone = clean_arg(args.split(',').next().unwrap_or_default());
            ActionIntent::GetTime {
                timezone: if timezone.is_empty() {
                    DEFAULT_TIMEZONE.to_string()
                } else {
                    timezone
                },
            }
        }
        ActionLabel::GetStockPrice => {
            let symbol = clean_arg(args.split(',').next().unwrap_or_default());
            if symbol.is_empty() {
                ActionIntent::Miscellaneous
            } else {
                ActionIntent::GetStockPrice {
                    symbol: symbol.to_uppercase(),
                }
            }
        }
        ActionLabel::SendMessage => {
            let mut parts = args.splitn(2, ',');
            let contact = clean_arg(parts.next().unwrap_or_default());
            let message = clean_arg(parts.next().unwrap_or_default());
            if contact.is_empty() || message.is_empty() {
                ActionIntent::Miscellaneous
            } else {
                ActionIntent::SendMessage { contact, message }
            }
        }
    }
}

fn clean_arg(arg: &str) -> String {
    arg.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

/// Capitalise a name the way contact keys are stored
///
/// First character uppercase, the rest lowercase.
pub fn capitalize_name(name: &str) -> String {
    let mut chars = name.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Name to phone number lookup for messaging intents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct ContactBook {
    contacts: HashMap<String, String>,
}

impl ContactBook {
    /// Create an empty contact book
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a contact
    pub fn insert(&mut self, name: &str, number: impl Into<String>) {
        self.contacts.insert(capitalize_name(name), number.into());
    }

    /// Look up a contact's number
    ///
    /// # Errors
    ///
    /// Returns `HelpdeskError::ContactNotFound` when no contact matches
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk::classifier::ContactBook;
    ///
    /// let mut book = ContactBook::new();
    /// book.insert("Ravi", "+911234567890");
    /// assert_eq!(book.resolve("ravi").unwrap(), "+911234567890");
    /// assert!(book.resolve("Meera").is_err());
    /// ```
    pub fn resolve(&self, name: &str) -> Result<&str> {
        let key = capitalize_name(name);
        self.contacts
            .get(&key)
            .map(String::as_str)
            .ok_or_else(|| HelpdeskError::ContactNotFound(key).into())
    }

    /// Number of contacts
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True when the book has no contacts
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl<N: AsRef<str>, V: Into<String>> FromIterator<(N, V)> for ContactBook {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut book = Self::new();
        for (name, number) in iter {
            book.insert(name.as_ref(), number);
        }
        book
    }
}

impl From<HashMap<String, String>> for ContactBook {
    fn from(contacts: HashMap<String, String>) -> Self {
        contacts.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_time_with_zone() {
        assert_eq!(
            parse_action("get_time, America/New_York"),
            ActionIntent::GetTime {
                timezone: "America/New_York".to_string()
            }
        );
    }

    #[test]
    fn test_get_time_defaults_to_india() {
        assert_eq!(
            parse_action("Get_Time"),
            ActionIntent::GetTime {
                timezone: DEFAULT_TIMEZONE.to_string()
            }
        );
    }

    #[test]
    fn test_stock_symbol_uppercased() {
        assert_eq!(
            parse_action("Get_Stock_Price,msft"),
            ActionIntent::GetStockPrice {
                symbol: "MSFT".to_string()
            }
        );
    }

    #[test]
    fn test_send_message_keeps_commas_in_body() {
        assert_eq!(
            parse_action("Send_Whatsapp_Message,ravi,Hi, see you at 5"),
            ActionIntent::SendMessage {
                contact: "ravi".to_string(),
                message: "Hi, see you at 5".to_string()
            }
        );
    }

    #[test]
    fn test_send_message_missing_body_is_miscellaneous() {
        assert_eq!(
            parse_action("Send_Whatsapp_Message,Ravi"),
            ActionIntent::Miscellaneous
        );
    }

    #[test]
    fn test_label_with_preamble_and_quotes() {
        assert_eq!(
            parse_action("\nClassification: \"Get_Stock_Price\",\"TSLA\"\n"),
            ActionIntent::GetStockPrice {
                symbol: "TSLA".to_string()
            }
        );
    }

    #[test]
    fn test_unlabelled_output_is_miscellaneous() {
        assert_eq!(parse_action("Miscellaneous"), ActionIntent::Miscellaneous);
        assert_eq!(parse_action(""), ActionIntent::Miscellaneous);
        assert_eq!(parse_action("tell me a joke"), ActionIntent::Miscellaneous);
    }

    #[test]
    fn test_capitalize_name() {
        assert_eq!(capitalize_name("rAVI"), "Ravi");
        assert_eq!(capitalize_name(" meera "), "Meera");
        assert_eq!(capitalize_name(""), "");
    }

    #[test]
    fn test_contact_book_resolve_missing() {
        let book: ContactBook = [("Ravi", "+91 1")].into_iter().collect();
        let err = book.resolve("anita").unwrap_err();
        match err.downcast_ref::<HelpdeskError>() {
            Some(HelpdeskError::ContactNotFound(name)) => assert_eq!(name, "Anita"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_contact_book_from_yaml() {
        let book: ContactBook = serde_yaml::from_str("Ravi: \"+911\"\nmeera: \"+912\"").unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book.resolve("Ravi").unwrap(), "+911");
        assert_eq!(book.resolve("Meera").unwrap(), "+912");
    }
}
