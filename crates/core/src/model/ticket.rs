#![forbid(unsafe_code)]

use super::ParseError;
use crate::ids::TicketId;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TicketStatus {
    Open,
    Picked,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] =
        [TicketStatus::Open, TicketStatus::Picked, TicketStatus::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            TicketStatus::Open => "OPEN",
            TicketStatus::Picked => "PICKED",
            TicketStatus::Closed => "CLOSED",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OPEN" => Ok(TicketStatus::Open),
            "PICKED" => Ok(TicketStatus::Picked),
            "CLOSED" => Ok(TicketStatus::Closed),
            other => Err(ParseError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized world position. The host owns the format; storage only keeps the text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location(String);

impl Location {
    pub fn new(serialized: impl Into<String>) -> Self {
        Self(serialized.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub id: TicketId,
    pub owner: Uuid,
    pub status: TicketStatus,
    pub picker: Option<Uuid>,
    pub location: Location,
}

impl Ticket {
    pub fn pick(&mut self, picker: Uuid) {
        self.status = TicketStatus::Picked;
        self.picker = Some(picker);
    }

    /// Hands the ticket back to the open queue.
    pub fn yield_pick(&mut self) {
        self.status = TicketStatus::Open;
        self.picker = None;
    }

    /// Keeps the picker so closed tickets still count towards highscores.
    pub fn close(&mut self, closer: Uuid) {
        self.status = TicketStatus::Closed;
        if self.picker.is_none() {
            self.picker = Some(closer);
        }
    }

    pub fn reopen(&mut self) {
        self.status = TicketStatus::Open;
        self.picker = None;
    }
}
