//! SQLite-backed `RecordStore` for the credential table.

pub mod migrations;

use std::path::Path;

use rusqlite::{ffi, params, Connection, OptionalExtension};
use tracing::info;

use kao_core::{
    config::DatabaseLocation,
    credentials::{RecordStore, StoreError, StoreResult},
};

pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Open (or create) the database and make sure the `keys` table exists.
    ///
    /// Any failure here is `StoreError::Connection`: the bot must not start without it.
    pub fn open(location: &DatabaseLocation) -> StoreResult<Self> {
        let conn = match location {
            DatabaseLocation::File(path) => open_file(path)?,
            DatabaseLocation::InMemory => Connection::open_in_memory().map_err(connection_err)?,
        };

        migrations::run(&conn).map_err(connection_err)?;

        match location {
            DatabaseLocation::File(path) => info!("Credential store opened at {}", path.display()),
            DatabaseLocation::InMemory => info!("Credential store opened in memory"),
        }
        Ok(Self { conn })
    }
}

fn open_file(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path).map_err(connection_err)?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(connection_err)?;
    Ok(conn)
}

fn connection_err(e: rusqlite::Error) -> StoreError {
    StoreError::Connection(e.to_string())
}

fn backend_err(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

impl RecordStore for SqliteRecordStore {
    fn select(&self, address: &str) -> StoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT api_key FROM keys WHERE email = ?1",
                params![address],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend_err)
    }

    fn insert(&mut self, address: &str, secret: &str) -> StoreResult<()> {
        match self.conn.execute(
            "INSERT INTO keys (email, api_key) VALUES (?1, ?2)",
            params![address, secret],
        ) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(StoreError::DuplicateKey(address.to_string()))
            }
            Err(e) => Err(backend_err(e)),
        }
    }

    fn update(&mut self, address: &str, secret: &str) -> StoreResult<usize> {
        self.conn
            .execute(
                "UPDATE keys SET api_key = ?1 WHERE email = ?2",
                params![secret, address],
            )
            .map_err(backend_err)
    }

    fn delete(&mut self, address: &str) -> StoreResult<usize> {
        self.conn
            .execute("DELETE FROM keys WHERE email = ?1", params![address])
            .map_err(backend_err)
    }
}
