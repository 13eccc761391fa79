#![forbid(unsafe_code)]

use super::codec::{NOTIFICATION_COLUMNS, encode_uuid, notification_from_row};
use super::{SqliteStore, StoreError};
use pt_core::PendingNotification;
use rusqlite::{TransactionBehavior, params};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Queued notifications grouped by recipient, in insertion order per recipient.
pub type NotificationBatch = BTreeMap<Uuid, Vec<PendingNotification>>;

#[derive(Clone, Copy, Debug)]
pub struct Notifications<'a> {
    store: &'a SqliteStore,
}

impl<'a> Notifications<'a> {
    pub(super) fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Drains the queue. Read and delete share one immediate transaction under the
    /// connection lock, so a concurrent insert is either returned here or left queued.
    ///
    /// Rows that fail to decode are logged and deleted with the rest.
    pub fn select_all_and_clear(&self) -> Result<NotificationBatch, StoreError> {
        let mut conn = self.store.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut batch = NotificationBatch::new();
        let mut drained = 0usize;
        {
            let mut stmt = tx.prepare(&format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notification ORDER BY rowid ASC"
            ))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                match notification_from_row(row) {
                    Ok((recipient, notification)) => {
                        batch.entry(recipient).or_default().push(notification);
                        drained += 1;
                    }
                    Err(StoreError::Decode { column, value }) => {
                        tracing::warn!(column, value = %value, "dropping undecodable notification");
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        tx.execute("DELETE FROM notification", [])?;
        tx.commit()?;

        tracing::debug!(drained, recipients = batch.len(), "drained pending notifications");
        Ok(batch)
    }

    /// Queues every notification in one transaction.
    ///
    /// Replacement tokens are `|`-joined without escaping; a token containing `|` comes
    /// back split.
    pub fn insert_all(&self, batch: &NotificationBatch) -> Result<usize, StoreError> {
        let mut conn = self.store.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO notification(uuid, message, replacements) VALUES (?1, ?2, ?3)",
            )?;
            for (recipient, notifications) in batch {
                let recipient = encode_uuid(*recipient);
                for notification in notifications {
                    stmt.execute(params![
                        recipient,
                        notification.message_key,
                        notification.joined_replacements(),
                    ])?;
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
