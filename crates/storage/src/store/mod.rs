#![forbid(unsafe_code)]

mod codec;
mod config;
mod error;
mod messages;
mod notifications;
mod settings;
mod support;
mod tickets;
mod writer;

pub use config::{DEFAULT_FILE_NAME, JournalMode, StoreConfig};
pub use error::StoreError;
pub use messages::Messages;
pub use notifications::{NotificationBatch, Notifications};
pub use settings::Settings;
pub use tickets::{TicketStats, Tickets};

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use writer::BackgroundWriter;

pub(crate) type SharedConnection = Arc<Mutex<Connection>>;

/// Handle to the ticket database.
///
/// Built once at startup and shared by reference. Every read and synchronous write locks
/// the single connection for the duration of its statement or transaction; ticket updates
/// go through a background writer thread that shares the same connection.
#[derive(Debug)]
pub struct SqliteStore {
    conn: SharedConnection,
    writer: BackgroundWriter,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(StoreConfig::new(storage_dir))
    }

    /// Opens (creating if needed) the database file and runs schema setup.
    ///
    /// Any setup failure is returned before the store is usable; nothing from a failed
    /// migration run is kept.
    pub fn open_with(config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.storage_dir)?;

        let db_path = config.db_path();
        let mut conn = Connection::open(&db_path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.pragma_update_and_check(
            None,
            "journal_mode",
            config.journal_mode.pragma_value(),
            |row| row.get::<_, String>(0),
        )?;

        let version = support::setup_sqlite_schema(&mut conn)?;
        tracing::info!(path = %db_path.display(), version, "ticket store ready");

        let conn = Arc::new(Mutex::new(conn));
        let writer = BackgroundWriter::spawn(Arc::clone(&conn))?;
        Ok(Self {
            conn,
            writer,
            config,
        })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.db_path()
    }

    pub fn schema_version(&self) -> Result<i64, StoreError> {
        let conn = self.lock()?;
        support::schema_version(&conn)
    }

    pub fn latest_schema_version() -> i64 {
        support::SCHEMA_VERSION
    }

    pub fn tickets(&self) -> Tickets<'_> {
        Tickets::new(self)
    }

    pub fn messages(&self) -> Messages<'_> {
        Messages::new(self)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings::new(self)
    }

    /// Blocks until every background update submitted before this call has run.
    pub fn flush_updates(&self) -> Result<(), StoreError> {
        self.writer.flush()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        lock_connection(&self.conn)
    }
}

pub(crate) fn lock_connection(
    conn: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, StoreError> {
    conn.lock().map_err(|_| StoreError::Poisoned)
}
