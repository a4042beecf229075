use crate::model::{Category, Record};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Content hash for change detection
/// NOTE: identity is record_id (UNIQUE); the hash tells whether a re-import
/// of the same puzzle number carries different content.
pub fn compute_content_hash(record: &Record) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.date_key());
    hasher.update(record.record_id.to_le_bytes());
    for category in &record.categories {
        hasher.update(format!("|{}:{}:", category.rank, category.name));
        hasher.update(category.words.join(","));
    }
    format!("{:x}", hasher.finalize())
}

/// Event for audit trail
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Event {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub entity_type: String,
    pub entity_id: String,
    pub data: serde_json::Value,
    pub actor: String,
}

impl Event {
    pub fn new(
        event_type: &str,
        entity_type: &str,
        entity_id: &str,
        data: serde_json::Value,
        actor: &str,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event_type: event_type.to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            data,
            actor: actor.to_string(),
        }
    }
}

/// Outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub inserted: usize,
    /// Same puzzle number already stored with identical content
    pub duplicates: usize,
    /// Same puzzle number already stored with different content (kept as is)
    pub conflicts: usize,
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS puzzles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            puzzle_uuid TEXT UNIQUE NOT NULL,
            record_id INTEGER UNIQUE NOT NULL,
            date TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            categories TEXT NOT NULL,
            source_file TEXT,
            parser_version TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // Audit trail
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT UNIQUE NOT NULL,
            timestamp TEXT NOT NULL,
            event_type TEXT NOT NULL,
            entity_type TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            data TEXT NOT NULL,
            actor TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_puzzles_date ON puzzles(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_entity ON events(entity_type, entity_id)",
        [],
    )?;

    Ok(())
}

pub fn insert_records(
    conn: &Connection,
    records: &[Record],
    source_file: &str,
    parser_version: &str,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();

    for record in records {
        let hash = compute_content_hash(record);
        let categories_json = serde_json::to_string(&record.categories)?;

        let result = conn.execute(
            "INSERT INTO puzzles (
                puzzle_uuid, record_id, date, content_hash, categories, source_file, parser_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                uuid::Uuid::new_v4().to_string(),
                record.record_id,
                record.date_key(),
                hash,
                categories_json,
                source_file,
                parser_version,
            ],
        );

        match result {
            Ok(_) => {
                summary.inserted += 1;

                let event = Event::new(
                    "puzzle_imported",
                    "puzzle",
                    &record.record_id.to_string(),
                    serde_json::json!({
                        "date": record.date_key(),
                        "content_hash": hash,
                        "source_file": source_file,
                    }),
                    "importer",
                );
                if let Err(e) = insert_event(conn, &event) {
                    warn!(record_id = record.record_id, "failed to log import event: {}", e);
                }
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let stored: Option<String> = conn
                    .query_row(
                        "SELECT content_hash FROM puzzles WHERE record_id = ?1",
                        [record.record_id],
                        |row| row.get(0),
                    )
                    .optional()?;

                if stored.as_deref() == Some(hash.as_str()) {
                    summary.duplicates += 1;
                } else {
                    warn!(
                        record_id = record.record_id,
                        date = %record.date_key(),
                        "stored puzzle differs from imported content; keeping stored version"
                    );
                    summary.conflicts += 1;
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        inserted = summary.inserted,
        duplicates = summary.duplicates,
        conflicts = summary.conflicts,
        "import finished"
    );

    Ok(summary)
}

/// Insert event into audit trail
pub fn insert_event(conn: &Connection, event: &Event) -> Result<()> {
    let data_json = serde_json::to_string(&event.data)?;

    conn.execute(
        "INSERT INTO events (
            event_id, timestamp, event_type, entity_type, entity_id, data, actor
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            event.event_id,
            event.timestamp.to_rfc3339(),
            event.event_type,
            event.entity_type,
            event.entity_id,
            data_json,
            event.actor,
        ],
    )?;

    Ok(())
}

/// Get events for a specific entity
pub fn get_events_for_entity(
    conn: &Connection,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<Event>> {
    let mut stmt = conn.prepare(
        "SELECT event_id, timestamp, event_type, entity_type, entity_id, data, actor
         FROM events
         WHERE entity_type = ?1 AND entity_id = ?2
         ORDER BY timestamp DESC",
    )?;

    let events = stmt
        .query_map(params![entity_type, entity_id], |row| {
            let timestamp_str: String = row.get(1)?;
            let data_json: String = row.get(5)?;

            Ok(Event {
                event_id: row.get(0)?,
                timestamp: DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?
                    .with_timezone(&Utc),
                event_type: row.get(2)?,
                entity_type: row.get(3)?,
                entity_id: row.get(4)?,
                data: serde_json::from_str(&data_json)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
                actor: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(events)
}

const RECORD_COLUMNS: &str = "date, record_id, categories";

fn record_from_row(row: &Row) -> rusqlite::Result<Record> {
    let date_str: String = row.get(0)?;
    let categories_json: String = row.get(2)?;

    let record_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let categories: Vec<Category> = serde_json::from_str(&categories_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;

    Ok(Record::new(record_date, row.get(1)?, categories))
}

/// All stored puzzles, oldest first
pub fn get_all_records(conn: &Connection) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM puzzles ORDER BY date ASC, record_id ASC",
        RECORD_COLUMNS
    ))?;

    let records = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

/// Puzzles for one YYYY-MM-DD date (usually zero or one)
pub fn get_records_by_date(conn: &Connection, date: &str) -> Result<Vec<Record>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM puzzles WHERE date = ?1 ORDER BY record_id ASC",
        RECORD_COLUMNS
    ))?;

    let records = stmt
        .query_map([date], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(records)
}

pub fn get_record_by_id(conn: &Connection, record_id: u32) -> Result<Option<Record>> {
    let record = conn
        .query_row(
            &format!("SELECT {} FROM puzzles WHERE record_id = ?1", RECORD_COLUMNS),
            [record_id],
            record_from_row,
        )
        .optional()?;

    Ok(record)
}

/// Puzzles whose category names or words contain `term` (case-insensitive)
pub fn search_records(conn: &Connection, term: &str) -> Result<Vec<Record>> {
    let records = get_all_records(conn)?;
    Ok(records.into_iter().filter(|r| r.matches(term)).collect())
}

pub fn count_records(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM puzzles", [], |row| row.get(0))?;

    Ok(count)
}

/// Write a consistent copy of the database into `backup_dir`
pub fn backup_database(conn: &Connection, backup_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(backup_dir).with_context(|| {
        format!("Failed to create backup directory: {}", backup_dir.display())
    })?;

    let file_name = format!("puzzles-{}.db", Utc::now().format("%Y%m%d-%H%M%S%.3f"));
    let dest = backup_dir.join(file_name);
    let dest_str = dest
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Backup path is not valid UTF-8: {}", dest.display()))?;

    conn.execute("VACUUM INTO ?1", [dest_str])
        .with_context(|| format!("Failed to write backup to {}", dest.display()))?;

    info!(path = %dest.display(), "database backup written");
    Ok(dest)
}
