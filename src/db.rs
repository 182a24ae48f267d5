use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;

use crate::parser::Snippet;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        -- Latest extractor output, replaced as a whole on every import
        CREATE TABLE IF NOT EXISTS parsed_snippets (
            position   INTEGER PRIMARY KEY,
            path       TEXT UNIQUE NOT NULL,
            id         TEXT NOT NULL,
            title      TEXT NOT NULL,
            code       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS imports (
            id          INTEGER PRIMARY KEY,
            source      TEXT NOT NULL,
            count       INTEGER NOT NULL,
            imported_at TEXT NOT NULL
        );

        -- User curated snippets, independent of the parsed set
        CREATE TABLE IF NOT EXISTS saved_snippets (
            position   INTEGER PRIMARY KEY,
            id         TEXT UNIQUE NOT NULL,
            title      TEXT NOT NULL,
            code       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

// ── Parsed docs ──

pub fn replace_parsed(conn: &Connection, snippets: &[Snippet], source: &str) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM parsed_snippets", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO parsed_snippets (position, path, id, title, code)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (i, s) in snippets.iter().enumerate() {
            stmt.execute(rusqlite::params![i as i64, s.path, s.id, s.title, s.code])?;
        }
    }
    tx.execute(
        "INSERT INTO imports (source, count, imported_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![source, snippets.len() as i64, Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    Ok(snippets.len())
}

pub fn fetch_parsed(conn: &Connection) -> Result<Vec<Snippet>> {
    let mut stmt =
        conn.prepare("SELECT id, title, path, code FROM parsed_snippets ORDER BY position")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Snippet {
                id: row.get(0)?,
                title: row.get(1)?,
                path: row.get(2)?,
                code: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn find_parsed(conn: &Connection, path: &str) -> Result<Option<Snippet>> {
    let row = conn
        .query_row(
            "SELECT id, title, path, code FROM parsed_snippets WHERE path = ?1",
            [path],
            |row| {
                Ok(Snippet {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    path: row.get(2)?,
                    code: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(row)
}

// ── Saved snippets ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSnippet {
    pub id: String,
    pub title: String,
    pub code: String,
}

pub fn fetch_saved(conn: &Connection) -> Result<Vec<SavedSnippet>> {
    let mut stmt = conn.prepare("SELECT id, title, code FROM saved_snippets ORDER BY position")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(SavedSnippet {
                id: row.get(0)?,
                title: row.get(1)?,
                code: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Insert or update by id. Returns `true` when an existing snippet was updated.
/// An update keeps the snippet's position.
pub fn upsert_saved(conn: &Connection, snippet: &SavedSnippet) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    let exists = tx
        .query_row(
            "SELECT 1 FROM saved_snippets WHERE id = ?1",
            [&snippet.id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    tx.execute(
        "INSERT INTO saved_snippets (id, title, code, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
             title = excluded.title,
             code = excluded.code,
             updated_at = excluded.updated_at",
        rusqlite::params![snippet.id, snippet.title, snippet.code, Utc::now().to_rfc3339()],
    )?;
    tx.commit()?;
    Ok(exists)
}

/// Returns `true` when a snippet was removed.
pub fn delete_saved(conn: &Connection, id: &str) -> Result<bool> {
    let n = conn.execute("DELETE FROM saved_snippets WHERE id = ?1", [id])?;
    Ok(n > 0)
}

// ── Stats ──

pub struct LastImport {
    pub source: String,
    pub count: usize,
    pub imported_at: String,
}

pub struct Stats {
    pub parsed: usize,
    pub saved: usize,
    pub imports: usize,
    pub last_import: Option<LastImport>,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let parsed: usize = conn.query_row("SELECT COUNT(*) FROM parsed_snippets", [], |r| r.get(0))?;
    let saved: usize = conn.query_row("SELECT COUNT(*) FROM saved_snippets", [], |r| r.get(0))?;
    let imports: usize = conn.query_row("SELECT COUNT(*) FROM imports", [], |r| r.get(0))?;
    let last_import = conn
        .query_row(
            "SELECT source, count, imported_at FROM imports ORDER BY id DESC LIMIT 1",
            [],
            |r| {
                Ok(LastImport {
                    source: r.get(0)?,
                    count: r.get(1)?,
                    imported_at: r.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(Stats {
        parsed,
        saved,
        imports,
        last_import,
    })
}
