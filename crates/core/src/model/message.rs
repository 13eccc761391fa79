#![forbid(unsafe_code)]

use super::ParseError;
use chrono::{DateTime, SubsecRound, Utc};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageReason {
    Message,
    Picked,
    Yielded,
    Closed,
    Done,
    Reopened,
    Note,
}

impl MessageReason {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageReason::Message => "MESSAGE",
            MessageReason::Picked => "PICKED",
            MessageReason::Yielded => "YIELDED",
            MessageReason::Closed => "CLOSED",
            MessageReason::Done => "DONE",
            MessageReason::Reopened => "REOPENED",
            MessageReason::Note => "NOTE",
        }
    }
}

impl FromStr for MessageReason {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MESSAGE" => Ok(MessageReason::Message),
            "PICKED" => Ok(MessageReason::Picked),
            "YIELDED" => Ok(MessageReason::Yielded),
            "CLOSED" => Ok(MessageReason::Closed),
            "DONE" => Ok(MessageReason::Done),
            "REOPENED" => Ok(MessageReason::Reopened),
            "NOTE" => Ok(MessageReason::Note),
            other => Err(ParseError::UnknownReason(other.to_string())),
        }
    }
}

/// One entry of a ticket thread.
///
/// Dates are kept at whole-second precision, the precision they are stored with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub reason: MessageReason,
    pub data: Option<String>,
    pub sender: Uuid,
    pub date: DateTime<Utc>,
}

impl Message {
    pub fn new(
        reason: MessageReason,
        data: Option<String>,
        sender: Uuid,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            reason,
            data,
            sender,
            date: date.trunc_subsecs(0),
        }
    }

    pub fn text(sender: Uuid, data: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self::new(MessageReason::Message, Some(data.into()), sender, date)
    }

    pub fn status_change(reason: MessageReason, sender: Uuid, date: DateTime<Utc>) -> Self {
        Self::new(reason, None, sender, date)
    }
}
