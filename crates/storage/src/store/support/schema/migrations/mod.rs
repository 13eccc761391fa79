#![forbid(unsafe_code)]

mod location;
mod purge;
mod util;

use super::super::super::StoreError;
use rusqlite::Connection;

type Step = fn(&Connection) -> Result<(), StoreError>;

/// `(resulting version, name, step)` in apply order.
const MIGRATIONS: &[(i64, &str, Step)] = &[
    (1, "ticket_location", location::apply),
    (2, "purge_unlocated_tickets_and_notifications", purge::apply),
];

pub(in crate::store) const SCHEMA_VERSION: i64 = 2;

pub(super) fn stored_version(conn: &Connection) -> Result<i64, StoreError> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, i64>(0))?)
}

pub(super) fn write_version(conn: &Connection, version: i64) -> Result<(), StoreError> {
    conn.pragma_update(None, "user_version", version)?;
    Ok(())
}

/// Applies every step whose resulting version is above `stored`. The version gate is the
/// only guard against re-running the data purges; there is no journal.
pub(super) fn apply(conn: &Connection, stored: i64) -> Result<i64, StoreError> {
    let mut version = stored;
    for (target, name, step) in MIGRATIONS {
        if version >= *target {
            continue;
        }
        step(conn)?;
        tracing::info!(from = version, to = *target, migration = *name, "applied schema migration");
        version = *target;
    }
    Ok(version)
}
