#![forbid(unsafe_code)]

use super::codec::{MESSAGE_COLUMNS, encode_date, encode_uuid, message_from_row};
use super::{SqliteStore, StoreError};
use pt_core::Message;
use pt_core::ids::TicketId;
use rusqlite::params;

/// Append-only ticket threads.
#[derive(Clone, Copy, Debug)]
pub struct Messages<'a> {
    store: &'a SqliteStore,
}

impl<'a> Messages<'a> {
    pub(super) fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    pub fn select_all(&self, ticket: TicketId) -> Result<Vec<Message>, StoreError> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM message WHERE ticket = ?1 ORDER BY rowid ASC"
        ))?;
        let mut rows = stmt.query(params![ticket.get()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(message_from_row(row)?);
        }
        Ok(out)
    }

    /// Appends to the thread. The ticket is not checked; orphans are tolerated.
    pub fn insert(&self, ticket: TicketId, message: &Message) -> Result<(), StoreError> {
        let conn = self.store.lock()?;
        conn.execute(
            "INSERT INTO message(ticket, reason, data, sender, date) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                ticket.get(),
                message.reason.as_str(),
                message.data,
                encode_uuid(message.sender),
                encode_date(message.date),
            ],
        )?;
        Ok(())
    }
}
