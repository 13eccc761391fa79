#![forbid(unsafe_code)]

use super::codec::{encode_announcements, encode_uuid, settings_from_row};
use super::{SqliteStore, StoreError};
use pt_core::UserSettings;
use rusqlite::params;
use uuid::Uuid;

/// Per-player preferences. There is no upsert: check [`Settings::exists`] and pick
/// `insert` or `update`.
#[derive(Clone, Copy, Debug)]
pub struct Settings<'a> {
    store: &'a SqliteStore,
}

impl<'a> Settings<'a> {
    pub(super) fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    pub fn select(&self, uuid: Uuid) -> Result<UserSettings, StoreError> {
        let conn = self.store.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT announcements FROM settings WHERE uuid = ?1 ORDER BY rowid ASC LIMIT 1",
        )?;
        let mut rows = stmt.query(params![encode_uuid(uuid)])?;
        match rows.next()? {
            Some(row) => settings_from_row(row),
            None => Err(StoreError::UnknownSettings(uuid)),
        }
    }

    pub fn exists(&self, uuid: Uuid) -> Result<bool, StoreError> {
        let conn = self.store.lock()?;
        let found: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM settings WHERE uuid = ?1)",
            params![encode_uuid(uuid)],
            |row| row.get(0),
        )?;
        Ok(found == 1)
    }

    pub fn insert(&self, uuid: Uuid, settings: &UserSettings) -> Result<(), StoreError> {
        let conn = self.store.lock()?;
        conn.execute(
            "INSERT INTO settings(uuid, announcements) VALUES (?1, ?2)",
            params![encode_uuid(uuid), encode_announcements(settings)],
        )?;
        Ok(())
    }

    /// Fails with [`StoreError::UnknownSettings`] when no row exists to update.
    pub fn update(&self, uuid: Uuid, settings: &UserSettings) -> Result<(), StoreError> {
        let conn = self.store.lock()?;
        let changed = conn.execute(
            "UPDATE settings SET announcements = ?1 WHERE uuid = ?2",
            params![encode_announcements(settings), encode_uuid(uuid)],
        )?;
        if changed == 0 {
            return Err(StoreError::UnknownSettings(uuid));
        }
        Ok(())
    }
}
