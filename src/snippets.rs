use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::builder;
use crate::config::Settings;
use crate::db::{self, SavedSnippet};
use crate::fetch;
use crate::parser::slug::{display_label, id_from_path, normalize_id};
use crate::parser::{parse_docs_html, Snippet};

/// Queries shorter than this list everything.
const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum SnippetError {
    #[error("Snippet code cannot be empty.")]
    EmptyCode,
    #[error("Please paste HTML content from the docs page.")]
    EmptyHtml,
    #[error("No snippets found in docs. The page structure might have changed.")]
    NoSnippetsInDocs,
    #[error("Could not find any snippets in the pasted HTML.")]
    NoSnippetsInPaste,
}

// ── Import ──

/// Fetch the docs page, extract snippets and replace the stored parsed set.
pub async fn import_from_url(conn: &Connection, settings: &Settings) -> Result<usize> {
    let html = fetch::fetch_docs(settings).await?;
    let snippets = parse_docs_html(&html, &settings.extract_options());
    if snippets.is_empty() {
        return Err(SnippetError::NoSnippetsInDocs.into());
    }
    store(conn, &snippets, &settings.docs_url)
}

/// Same as [`import_from_url`] for HTML a user pasted or saved to disk.
pub fn import_from_html(
    conn: &Connection,
    settings: &Settings,
    html: &str,
    source: &str,
) -> Result<usize> {
    if html.trim().is_empty() {
        return Err(SnippetError::EmptyHtml.into());
    }
    let snippets = parse_docs_html(html, &settings.extract_options());
    if snippets.is_empty() {
        return Err(SnippetError::NoSnippetsInPaste.into());
    }
    store(conn, &snippets, source)
}

fn store(conn: &Connection, snippets: &[Snippet], source: &str) -> Result<usize> {
    let count = db::replace_parsed(conn, snippets, source)?;
    info!(count, source, "imported snippets");
    Ok(count)
}

// ── Picker ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerItem {
    /// Full path, the lookup key for [`get_parsed`].
    pub value: String,
    pub label: String,
}

/// Case-insensitive substring match on display labels, in document order.
pub fn search(
    parsed: &[Snippet],
    query: &str,
    boilerplate: Option<&str>,
    limit: usize,
) -> Vec<PickerItem> {
    let query = query.trim().to_lowercase();
    let match_all = query.chars().count() < MIN_QUERY_LEN;

    parsed
        .iter()
        .map(|s| PickerItem {
            value: s.path.clone(),
            label: display_label(&s.path, boilerplate).to_string(),
        })
        .filter(|item| match_all || item.label.to_lowercase().contains(&query))
        .take(limit)
        .collect()
}

/// Parsed snippet for `path`, with the id a user would save it under.
pub fn get_parsed(conn: &Connection, settings: &Settings, path: &str) -> Result<Option<Snippet>> {
    let found = db::find_parsed(conn, path)?.map(|mut s| {
        s.id = id_from_path(&s.path, settings.boilerplate());
        s
    });
    Ok(found)
}

// ── Saved snippets ──

#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub id: Option<String>,
    pub title: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub id: String,
    pub updated: bool,
}

/// Upsert a snippet by id and rebuild the output file.
pub fn save(conn: &Connection, settings: &Settings, req: SaveRequest) -> Result<SaveOutcome> {
    if req.code.trim().is_empty() {
        return Err(SnippetError::EmptyCode.into());
    }
    let boilerplate = settings.boilerplate();
    let title = req.title.trim().to_string();

    let id = req
        .id
        .as_deref()
        .map(|id| normalize_id(id, boilerplate))
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| {
            let micros = Utc::now().timestamp_micros();
            normalize_id(&format!("{title}-{micros}"), boilerplate)
        });
    let title = if title.is_empty() {
        format!("Snippet {id}")
    } else {
        title
    };

    let updated = db::upsert_saved(
        conn,
        &SavedSnippet {
            id: id.clone(),
            title,
            code: req.code,
        },
    )?;
    rebuild(conn, settings)?;
    Ok(SaveOutcome { id, updated })
}

/// Remove a snippet and rebuild the output file. Returns whether it existed.
pub fn delete(conn: &Connection, settings: &Settings, id: &str) -> Result<bool> {
    let removed = db::delete_saved(conn, &crate::parser::slug::slugify(id))?;
    rebuild(conn, settings)?;
    Ok(removed)
}

pub fn rebuild(conn: &Connection, settings: &Settings) -> Result<()> {
    let saved = db::fetch_saved(conn)?;
    builder::write(&settings.output_path, &settings.plugin_name, &saved)
}
