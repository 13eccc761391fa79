#![forbid(unsafe_code)]

/// Joins replacement tokens in storage. Tokens containing it are not escaped.
pub const REPLACEMENT_DELIMITER: &str = "|";

/// A message queued for a player who was offline when it was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingNotification {
    pub message_key: String,
    pub replacements: Vec<String>,
}

impl PendingNotification {
    pub fn new(message_key: impl Into<String>, replacements: Vec<String>) -> Self {
        Self {
            message_key: message_key.into(),
            replacements,
        }
    }

    /// Column text for the tokens. No tokens is `None` (stored as NULL), so a single empty
    /// token still round-trips.
    pub fn joined_replacements(&self) -> Option<String> {
        if self.replacements.is_empty() {
            return None;
        }
        Some(self.replacements.join(REPLACEMENT_DELIMITER))
    }

    pub fn split_replacements(joined: Option<&str>) -> Vec<String> {
        match joined {
            Some(joined) => joined
                .split(REPLACEMENT_DELIMITER)
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }
}
