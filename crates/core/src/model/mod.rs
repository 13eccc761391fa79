#![forbid(unsafe_code)]

mod message;
mod notification;
mod settings;
mod ticket;

pub use message::{Message, MessageReason};
pub use notification::{PendingNotification, REPLACEMENT_DELIMITER};
pub use settings::UserSettings;
pub use ticket::{Location, Ticket, TicketStatus};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown ticket status: {0}")]
    UnknownStatus(String),
    #[error("unknown message reason: {0}")]
    UnknownReason(String),
}
