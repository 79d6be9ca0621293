// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use fieldticket_app::{ClientStateKey, ClientStateStore};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

pub const APP_NAME: &str = "fieldticket";

const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[("client_state", &["key", "value", "updated_at"])];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientStateEntry {
    pub key: ClientStateKey,
    pub value: String,
    pub updated_at: OffsetDateTime,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        debug!(path = %path.display(), "client state database opened");
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    pub fn bootstrap(&self) -> Result<()> {
        if has_user_tables(&self.conn)? {
            validate_schema(&self.conn)?;
        } else {
            self.conn
                .execute_batch(include_str!("sql/schema.sql"))
                .context("create schema")?;
        }
        Ok(())
    }

    pub fn get_client_state(&self, key: ClientStateKey) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM client_state WHERE key = ?",
                params![key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("read client state {}", key.as_str()))
    }

    pub fn put_client_state(&self, key: ClientStateKey, value: &str) -> Result<()> {
        let now = now_rfc3339()?;
        self.conn
            .execute(
                "
                INSERT INTO client_state (key, value, updated_at)
                VALUES (?, ?, ?)
                ON CONFLICT(key) DO UPDATE SET
                  value = excluded.value,
                  updated_at = excluded.updated_at
                ",
                params![key.as_str(), value, now],
            )
            .with_context(|| format!("upsert client state {}", key.as_str()))?;
        Ok(())
    }

    pub fn remove_client_state(&self, key: ClientStateKey) -> Result<()> {
        self.conn
            .execute(
                "DELETE FROM client_state WHERE key = ?",
                params![key.as_str()],
            )
            .with_context(|| format!("delete client state {}", key.as_str()))?;
        Ok(())
    }

    /// Every stored entry with a recognised key, in key order. Rows written
    /// under unknown keys are skipped.
    pub fn list_client_state(&self) -> Result<Vec<ClientStateEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value, updated_at FROM client_state ORDER BY key")
            .context("prepare client state listing")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .context("list client state")?;

        let mut entries = Vec::new();
        for row in rows {
            let (raw_key, value, updated_at) = row.context("read client state row")?;
            let Some(key) = ClientStateKey::parse(&raw_key) else {
                debug!(key = %raw_key, "skipping unknown client state key");
                continue;
            };
            let updated_at = OffsetDateTime::parse(&updated_at, &Rfc3339).with_context(|| {
                format!("client state {raw_key} has invalid timestamp {updated_at:?}")
            })?;
            entries.push(ClientStateEntry {
                key,
                value,
                updated_at,
            });
        }
        Ok(entries)
    }
}

impl ClientStateStore for Store {
    fn get_state(&self, key: ClientStateKey) -> Result<Option<String>> {
        self.get_client_state(key)
    }

    fn put_state(&self, key: ClientStateKey, value: &str) -> Result<()> {
        self.put_client_state(key, value)
    }

    fn remove_state(&self, key: ClientStateKey) -> Result<()> {
        self.remove_client_state(key)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("FIELDTICKET_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!(
            "cannot resolve data directory; set FIELDTICKET_DB_PATH to a writable database path"
        )
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("fieldticket.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn has_user_tables(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "
            SELECT COUNT(*)
            FROM sqlite_master
            WHERE type = 'table'
              AND name NOT LIKE 'sqlite_%'
            ",
            [],
            |row| row.get(0),
        )
        .context("count user tables")?;
    Ok(count > 0)
}

fn validate_schema(conn: &Connection) -> Result<()> {
    for (table, required_columns) in REQUIRED_SCHEMA {
        if !table_exists(conn, table)? {
            bail!(
                "database is missing required table `{table}`; point [storage].db_path at a fieldticket database or remove the file"
            );
        }

        let columns = table_columns(conn, table)?;
        let missing: Vec<&str> = required_columns
            .iter()
            .copied()
            .filter(|column| !columns.contains(*column))
            .collect();

        if !missing.is_empty() {
            bail!(
                "table `{table}` is missing required columns: {}; remove the database file to recreate it",
                missing.join(", ")
            );
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
            params![table],
            |row| row.get(0),
        )
        .with_context(|| format!("check table {table}"))?;
    Ok(count > 0)
}

fn table_columns(conn: &Connection, table: &str) -> Result<BTreeSet<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("read columns for {table}"))?;
    rows.collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}

fn now_rfc3339() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .context("format current timestamp")
}

#[cfg(test)]
mod tests {
    use super::Store;
    use anyhow::Result;
    use fieldticket_app::ClientStateKey;

    #[test]
    fn upsert_replaces_value() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.put_client_state(ClientStateKey::Theme, "light")?;
        store.put_client_state(ClientStateKey::Theme, "dark")?;
        assert_eq!(
            store.get_client_state(ClientStateKey::Theme)?.as_deref(),
            Some("dark")
        );
        assert_eq!(store.list_client_state()?.len(), 1);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_skipped_in_listing() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;

        store.raw_connection().execute(
            "INSERT INTO client_state (key, value, updated_at) VALUES ('legacy', 'x', '2026-01-01T00:00:00Z')",
            [],
        )?;
        store.put_client_state(ClientStateKey::UserId, "u1")?;

        let entries = store.list_client_state()?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, ClientStateKey::UserId);
        Ok(())
    }
}
