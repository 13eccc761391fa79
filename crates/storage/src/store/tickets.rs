#![forbid(unsafe_code)]

use super::codec::{TICKET_COLUMNS, encode_uuid, ticket_from_row, uuid_column};
use super::writer::WriteJob;
use super::{SqliteStore, StoreError};
use chrono::Utc;
use pt_core::directory::UserDirectory;
use pt_core::ids::TicketId;
use pt_core::span::TimeAmount;
use pt_core::{Location, Ticket, TicketStatus};
use rusqlite::{Connection, Params, TransactionBehavior, params, params_from_iter};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

pub type TicketStats = BTreeMap<TicketStatus, i64>;

/// Ticket table queries. Borrowed from [`SqliteStore::tickets`].
#[derive(Clone, Copy, Debug)]
pub struct Tickets<'a> {
    store: &'a SqliteStore,
}

impl<'a> Tickets<'a> {
    pub(super) fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Point lookup. A missing row is [`StoreError::UnknownTicket`].
    pub fn select(&self, id: TicketId) -> Result<Ticket, StoreError> {
        let conn = self.store.lock()?;
        select_in(&conn, id)?.ok_or(StoreError::UnknownTicket(id))
    }

    /// Batch lookup; ids without a row are left out of the map.
    pub fn select_many(&self, ids: &[TicketId]) -> Result<BTreeMap<TicketId, Ticket>, StoreError> {
        let conn = self.store.lock()?;
        let mut out = BTreeMap::new();
        for id in ids {
            if let Some(ticket) = select_in(&conn, *id)? {
                out.insert(*id, ticket);
            }
        }
        Ok(out)
    }

    pub fn select_all(&self, status: Option<TicketStatus>) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.store.lock()?;
        query_tickets(
            &conn,
            &format!(
                "SELECT {TICKET_COLUMNS} FROM ticket \
                 WHERE (?1 IS NULL OR status = ?1) \
                 ORDER BY id ASC"
            ),
            params![status.map(TicketStatus::as_str)],
        )
    }

    pub fn select_all_for(
        &self,
        owner: Uuid,
        status: Option<TicketStatus>,
    ) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.store.lock()?;
        query_tickets(
            &conn,
            &format!(
                "SELECT {TICKET_COLUMNS} FROM ticket \
                 WHERE uuid = ?1 AND (?2 IS NULL OR status = ?2) \
                 ORDER BY id ASC"
            ),
            params![encode_uuid(owner), status.map(TicketStatus::as_str)],
        )
    }

    pub fn select_ids(
        &self,
        owner: Uuid,
        status: Option<TicketStatus>,
    ) -> Result<Vec<TicketId>, StoreError> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id FROM ticket \
             WHERE uuid = ?1 AND (?2 IS NULL OR status = ?2) \
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(
            params![encode_uuid(owner), status.map(TicketStatus::as_str)],
            |row| row.get::<_, i64>(0).map(TicketId::new),
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Highest id among `owner`'s tickets in any of `statuses`; all statuses when empty.
    pub fn select_highest_id(
        &self,
        owner: Uuid,
        statuses: &[TicketStatus],
    ) -> Result<Option<TicketId>, StoreError> {
        let conn = self.store.lock()?;
        highest_id_in(&conn, owner, statuses)
    }

    pub fn select_last(
        &self,
        owner: Uuid,
        statuses: &[TicketStatus],
    ) -> Result<Option<Ticket>, StoreError> {
        let conn = self.store.lock()?;
        match highest_id_in(&conn, owner, statuses)? {
            Some(id) => select_in(&conn, id),
            None => Ok(None),
        }
    }

    /// Distinct owner names. Owners the directory cannot resolve are dropped.
    pub fn select_names(
        &self,
        status: Option<TicketStatus>,
        directory: &dyn UserDirectory,
    ) -> Result<Vec<String>, StoreError> {
        let owners = {
            let conn = self.store.lock()?;
            let mut stmt = conn.prepare(
                "SELECT DISTINCT uuid FROM ticket \
                 WHERE (?1 IS NULL OR status = ?1) \
                 ORDER BY uuid ASC",
            )?;
            let mut rows = stmt.query(params![status.map(TicketStatus::as_str)])?;
            let mut owners = Vec::new();
            while let Some(row) = rows.next()? {
                owners.push(uuid_column(row, "uuid")?);
            }
            owners
        };

        Ok(owners
            .into_iter()
            .filter_map(|owner| directory.name_of(owner))
            .collect())
    }

    /// Per-status counts from a single aggregate query. Every status has an entry.
    pub fn select_ticket_stats(&self, owner: Option<Uuid>) -> Result<TicketStats, StoreError> {
        let conn = self.store.lock()?;
        let (open, picked, closed) = conn.query_row(
            "SELECT \
               SUM(status LIKE 'OPEN') AS open, \
               SUM(status LIKE 'PICKED') AS picked, \
               SUM(status LIKE 'CLOSED') AS closed \
             FROM ticket \
             WHERE (?1 IS NULL OR uuid = ?1)",
            params![owner.map(encode_uuid)],
            |row| {
                Ok((
                    row.get::<_, Option<i64>>("open")?,
                    row.get::<_, Option<i64>>("picked")?,
                    row.get::<_, Option<i64>>("closed")?,
                ))
            },
        )?;

        Ok(TicketStats::from([
            (TicketStatus::Open, open.unwrap_or(0)),
            (TicketStatus::Picked, picked.unwrap_or(0)),
            (TicketStatus::Closed, closed.unwrap_or(0)),
        ]))
    }

    pub fn highscores(&self, span: TimeAmount) -> Result<HashMap<Uuid, i64>, StoreError> {
        self.highscores_since(span.cutoff_secs(Utc::now()))
    }

    /// Closed tickets per picker, counting only tickets with a message dated after
    /// `cutoff_secs` (epoch seconds).
    pub fn highscores_since(&self, cutoff_secs: i64) -> Result<HashMap<Uuid, i64>, StoreError> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare(
            "SELECT picker, COUNT(*) AS num \
             FROM ticket \
             WHERE status = ?1 \
               AND picker IS NOT NULL \
               AND id IN (SELECT DISTINCT ticket FROM message WHERE CAST(date AS INTEGER) > ?2) \
             GROUP BY picker",
        )?;
        let mut rows = stmt.query(params![TicketStatus::Closed.as_str(), cutoff_secs])?;
        let mut out = HashMap::new();
        while let Some(row) = rows.next()? {
            out.insert(uuid_column(row, "picker")?, row.get::<_, i64>("num")?);
        }
        Ok(out)
    }

    pub fn exists(&self, id: TicketId) -> Result<bool, StoreError> {
        let conn = self.store.lock()?;
        let found: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM ticket WHERE id = ?1)",
            params![id.get()],
            |row| row.get(0),
        )?;
        Ok(found == 1)
    }

    pub fn count(&self, status: Option<TicketStatus>) -> Result<i64, StoreError> {
        let conn = self.store.lock()?;
        Ok(conn.query_row(
            "SELECT COUNT(id) FROM ticket WHERE (?1 IS NULL OR status = ?1)",
            params![status.map(TicketStatus::as_str)],
            |row| row.get(0),
        )?)
    }

    pub fn count_for(&self, owner: Uuid, status: TicketStatus) -> Result<i64, StoreError> {
        let conn = self.store.lock()?;
        Ok(conn.query_row(
            "SELECT COUNT(id) FROM ticket WHERE uuid = ?1 AND status = ?2",
            params![encode_uuid(owner), status.as_str()],
            |row| row.get(0),
        )?)
    }

    /// Allocates `max(id) + 1` and inserts in the same immediate transaction, so two
    /// writers can never be handed the same id.
    pub fn insert(
        &self,
        owner: Uuid,
        status: TicketStatus,
        picker: Option<Uuid>,
        location: &Location,
    ) -> Result<TicketId, StoreError> {
        if location.is_blank() {
            return Err(StoreError::InvalidInput("ticket location must not be blank"));
        }

        let mut conn = self.store.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let highest: Option<i64> =
            tx.query_row("SELECT max(id) FROM ticket", [], |row| row.get(0))?;
        let id = TicketId::new(highest.unwrap_or(0))
            .next()
            .ok_or(StoreError::InvalidInput("ticket id space exhausted"))?;

        tx.execute(
            "INSERT INTO ticket(id, uuid, status, picker, location) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id.get(),
                encode_uuid(owner),
                status.as_str(),
                picker.map(encode_uuid),
                location.as_str(),
            ],
        )?;
        tx.commit()?;

        tracing::debug!(%id, %owner, "allocated ticket id");
        Ok(id)
    }

    /// Queues a status/picker write and returns at once.
    ///
    /// Owner and location never change after insert, so only those two columns are
    /// written. A read issued right after this call may still see the old values; call
    /// [`SqliteStore::flush_updates`] first when that matters.
    pub fn update(&self, ticket: &Ticket) {
        self.store.writer.submit(WriteJob::TicketUpdate {
            id: ticket.id,
            status: ticket.status,
            picker: ticket.picker,
        });
    }
}

pub(super) fn update_status_and_picker(
    conn: &Connection,
    id: TicketId,
    status: TicketStatus,
    picker: Option<Uuid>,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE ticket SET status = ?1, picker = ?2 WHERE id = ?3",
        params![status.as_str(), picker.map(encode_uuid), id.get()],
    )?)
}

fn select_in(conn: &Connection, id: TicketId) -> Result<Option<Ticket>, StoreError> {
    let mut stmt =
        conn.prepare_cached(&format!("SELECT {TICKET_COLUMNS} FROM ticket WHERE id = ?1"))?;
    let mut rows = stmt.query(params![id.get()])?;
    match rows.next()? {
        Some(row) => Ok(Some(ticket_from_row(row)?)),
        None => Ok(None),
    }
}

fn highest_id_in(
    conn: &Connection,
    owner: Uuid,
    statuses: &[TicketStatus],
) -> Result<Option<TicketId>, StoreError> {
    let mut sql = String::from("SELECT max(id) FROM ticket WHERE uuid = ?1");
    if !statuses.is_empty() {
        let placeholders = (0..statuses.len())
            .map(|index| format!("?{}", index + 2))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" AND status IN ({placeholders})"));
    }

    let mut values = Vec::with_capacity(statuses.len() + 1);
    values.push(encode_uuid(owner));
    values.extend(statuses.iter().map(|status| status.as_str().to_string()));

    let highest = conn.query_row(&sql, params_from_iter(values.iter()), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(highest.map(TicketId::new))
}

fn query_tickets(
    conn: &Connection,
    sql: &str,
    params: impl Params,
) -> Result<Vec<Ticket>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        out.push(ticket_from_row(row)?);
    }
    Ok(out)
}
