#![forbid(unsafe_code)]

use pt_core::ids::TicketId;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("unknown ticket {0}")]
    UnknownTicket(TicketId),
    #[error("no settings stored for {0}")]
    UnknownSettings(Uuid),
    #[error("cannot decode column {column} (value={value:?})")]
    Decode { column: &'static str, value: String },
    #[error("connection lock poisoned")]
    Poisoned,
    #[error("background writer stopped")]
    WriterStopped,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "SQLITE",
            Self::Json(_) => "CONFIG",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::UnknownTicket(_) => "UNKNOWN_TICKET",
            Self::UnknownSettings(_) => "UNKNOWN_SETTINGS",
            Self::Decode { .. } => "DECODE",
            Self::Poisoned => "POISONED",
            Self::WriterStopped => "WRITER_STOPPED",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownTicket(_) | Self::UnknownSettings(_))
    }

    pub(crate) fn decode(column: &'static str, value: impl Into<String>) -> Self {
        Self::Decode {
            column,
            value: value.into(),
        }
    }
}
