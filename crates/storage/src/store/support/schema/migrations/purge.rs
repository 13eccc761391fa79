#![forbid(unsafe_code)]

use super::super::super::super::StoreError;
use rusqlite::Connection;

// Drops tickets that never got a location and every queued notification.
pub(super) fn apply(conn: &Connection) -> Result<(), StoreError> {
    let tickets = conn.execute(
        "DELETE FROM ticket WHERE location IS NULL OR trim(location) = ''",
        [],
    )?;
    let notifications = conn.execute("DELETE FROM notification", [])?;
    tracing::info!(
        tickets,
        notifications,
        "purged tickets without location and stale notifications"
    );
    Ok(())
}
