#![forbid(unsafe_code)]

//! Row codec: maps raw `rusqlite` rows to domain records and back to column text.
//!
//! All columns are text (the `ticket.id` and `message.ticket` columns aside), so every
//! decode goes through a parse step that can fail with [`StoreError::Decode`].

use super::StoreError;
use chrono::{DateTime, Utc};
use pt_core::ids::TicketId;
use pt_core::{
    Location, Message, MessageReason, PendingNotification, Ticket, TicketStatus, UserSettings,
};
use rusqlite::Row;
use uuid::Uuid;

pub(crate) const TICKET_COLUMNS: &str = "id, uuid, status, picker, location";
pub(crate) const MESSAGE_COLUMNS: &str = "reason, data, sender, date";
pub(crate) const NOTIFICATION_COLUMNS: &str = "uuid, message, replacements";

const ANNOUNCEMENTS_ON: &str = "1";
const ANNOUNCEMENTS_OFF: &str = "0";

pub(crate) fn ticket_from_row(row: &Row<'_>) -> Result<Ticket, StoreError> {
    let location = row
        .get::<_, Option<String>>("location")?
        .ok_or_else(|| StoreError::decode("location", "NULL"))?;
    Ok(Ticket {
        id: TicketId::new(row.get("id")?),
        owner: uuid_column(row, "uuid")?,
        status: status_column(row, "status")?,
        picker: optional_uuid_column(row, "picker")?,
        location: Location::new(location),
    })
}

pub(crate) fn message_from_row(row: &Row<'_>) -> Result<Message, StoreError> {
    let reason: String = row.get("reason")?;
    let reason = reason
        .parse::<MessageReason>()
        .map_err(|_| StoreError::decode("reason", reason))?;
    Ok(Message {
        reason,
        data: row.get("data")?,
        sender: uuid_column(row, "sender")?,
        date: date_column(row, "date")?,
    })
}

pub(crate) fn notification_from_row(
    row: &Row<'_>,
) -> Result<(Uuid, PendingNotification), StoreError> {
    let recipient = uuid_column(row, "uuid")?;
    let message_key: String = row.get("message")?;
    let joined: Option<String> = row.get("replacements")?;
    let replacements = PendingNotification::split_replacements(joined.as_deref());
    Ok((recipient, PendingNotification::new(message_key, replacements)))
}

pub(crate) fn settings_from_row(row: &Row<'_>) -> Result<UserSettings, StoreError> {
    let announcements: Option<String> = row.get("announcements")?;
    Ok(UserSettings::new(announcements.as_deref() == Some(ANNOUNCEMENTS_ON)))
}

pub(crate) fn uuid_column(row: &Row<'_>, column: &'static str) -> Result<Uuid, StoreError> {
    let raw: String = row.get(column)?;
    parse_uuid(column, raw)
}

pub(crate) fn optional_uuid_column(
    row: &Row<'_>,
    column: &'static str,
) -> Result<Option<Uuid>, StoreError> {
    row.get::<_, Option<String>>(column)?
        .map(|raw| parse_uuid(column, raw))
        .transpose()
}

fn status_column(row: &Row<'_>, column: &'static str) -> Result<TicketStatus, StoreError> {
    let raw: String = row.get(column)?;
    raw.parse::<TicketStatus>()
        .map_err(|_| StoreError::decode(column, raw))
}

fn date_column(row: &Row<'_>, column: &'static str) -> Result<DateTime<Utc>, StoreError> {
    let raw: String = row.get(column)?;
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| StoreError::decode(column, raw))
}

fn parse_uuid(column: &'static str, raw: String) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw.trim()).map_err(|_| StoreError::decode(column, raw))
}

pub(crate) fn encode_uuid(value: Uuid) -> String {
    value.hyphenated().to_string()
}

pub(crate) fn encode_date(value: DateTime<Utc>) -> String {
    value.timestamp().to_string()
}

pub(crate) fn encode_announcements(settings: &UserSettings) -> &'static str {
    if settings.announcements {
        ANNOUNCEMENTS_ON
    } else {
        ANNOUNCEMENTS_OFF
    }
}
