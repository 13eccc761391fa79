#![forbid(unsafe_code)]

mod migrations;
mod sql;

use super::super::StoreError;
use rusqlite::{Connection, TransactionBehavior};

pub(in crate::store) use migrations::SCHEMA_VERSION;

/// Creates missing tables and brings the schema up to [`SCHEMA_VERSION`].
///
/// Runs as one immediate transaction: a failing statement rolls back every earlier step,
/// including the version bump, so the next start retries from the same version.
pub(in crate::store) fn setup_sqlite_schema(conn: &mut Connection) -> Result<i64, StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(&sql::full_schema_sql())?;

    let stored = migrations::stored_version(&tx)?;
    let version = migrations::apply(&tx, stored)?;
    if version != stored {
        migrations::write_version(&tx, version)?;
    }

    tx.commit()?;
    Ok(version)
}

pub(in crate::store) fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    migrations::stored_version(conn)
}
