use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};

use crate::model::{Entry, EntryStatus};
use crate::util::{ensure_directory, now_utc_string};

const DB_SCHEMA_VERSION: &str = "1.0.0";

/// Persistent store for extracted entries, their corrections and validation
/// history. The core pipeline never depends on this module; commands wire it
/// in at the edges.
pub struct VocabStore {
    conn: Connection,
}

#[derive(Debug, Clone)]
pub struct StoredEntry {
    pub id: i64,
    pub headword: String,
    pub translation: String,
    pub corrected_translation: Option<String>,
    pub source_language: String,
    pub target_language: String,
    pub source_file: Option<String>,
    pub status: String,
    pub similarity_score: Option<f64>,
    pub translator_result: Option<String>,
    pub ocr_context: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl StoredEntry {
    /// The translation a card should carry: the manual correction when one
    /// exists, the OCR text otherwise.
    pub fn effective_translation(&self) -> &str {
        self.corrected_translation
            .as_deref()
            .unwrap_or(&self.translation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    pub status: Option<EntryStatus>,
    pub source: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub total: i64,
    pub by_status: Vec<(String, i64)>,
    pub by_source: Vec<(String, i64)>,
    pub corrections: i64,
}

impl VocabStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        configure_connection(&conn)?;
        ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Inserts the pair unless (headword, source_file) already exists.
    /// Returns whether a row was inserted.
    pub fn insert_if_absent(
        &mut self,
        entry: &Entry,
        source_language: &str,
        target_language: &str,
        source_file: &str,
        ocr_context: Option<&str>,
    ) -> Result<bool> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM vocabulary WHERE headword = ?1 AND source_file = ?2",
                params![entry.headword, source_file],
                |row| row.get(0),
            )
            .optional()
            .context("failed to check for existing entry")?;

        if existing.is_some() {
            return Ok(false);
        }

        let now = now_utc_string();
        self.conn
            .execute(
                "
                INSERT INTO vocabulary(
                  headword, translation, source_language, target_language,
                  source_file, status, ocr_context, created_at, updated_at
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                ",
                params![
                    entry.headword,
                    entry.translation,
                    source_language,
                    target_language,
                    source_file,
                    EntryStatus::Pending.as_str(),
                    ocr_context,
                    now,
                ],
            )
            .context("failed to insert vocabulary entry")?;

        Ok(true)
    }

    pub fn get(&self, id: i64) -> Result<Option<StoredEntry>> {
        self.conn
            .query_row(
                "SELECT * FROM vocabulary WHERE id = ?1",
                params![id],
                row_to_entry,
            )
            .optional()
            .with_context(|| format!("failed to load entry {id}"))
    }

    pub fn find_id(&self, headword: &str, source_file: &str) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM vocabulary WHERE headword = ?1 AND source_file = ?2",
                params![headword, source_file],
                |row| row.get(0),
            )
            .optional()
            .context("failed to look up entry id")
    }

    pub fn list(&self, query: &EntryQuery) -> Result<Vec<StoredEntry>> {
        let mut sql = String::from("SELECT * FROM vocabulary WHERE 1=1");
        let mut bindings: Vec<String> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bindings.push(status.as_str().to_string());
        }
        if let Some(source) = &query.source {
            sql.push_str(" AND source_file LIKE ?");
            bindings.push(format!("%{source}%"));
        }

        sql.push_str(" ORDER BY id");
        if query.limit > 0 {
            sql.push_str(&format!(" LIMIT {}", query.limit));
        }

        let mut statement = self
            .conn
            .prepare(&sql)
            .context("failed to prepare list query")?;
        let rows = statement
            .query_map(params_from_iter(bindings.iter()), row_to_entry)
            .context("failed to run list query")?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.context("failed to read entry row")?);
        }
        Ok(entries)
    }

    pub fn update_status(&self, id: i64, status: EntryStatus) -> Result<()> {
        let affected = self
            .conn
            .execute(
                "UPDATE vocabulary SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.as_str(), now_utc_string(), id],
            )
            .with_context(|| format!("failed to update status for entry {id}"))?;
        if affected == 0 {
            anyhow::bail!("entry {id} not found");
        }
        Ok(())
    }

    /// Stores a validation run result and mirrors it onto the entry row.
    pub fn record_validation(
        &mut self,
        id: i64,
        translator_result: Option<&str>,
        similarity_score: f64,
        status: EntryStatus,
    ) -> Result<()> {
        let now = now_utc_string();
        let tx = self
            .conn
            .transaction()
            .context("failed to start validation transaction")?;

        tx.execute(
            "
            INSERT INTO validation_results(vocabulary_id, translator_result, similarity_score, validated_at)
            VALUES(?1, ?2, ?3, ?4)
            ",
            params![id, translator_result, similarity_score, now],
        )
        .context("failed to insert validation result")?;

        tx.execute(
            "
            UPDATE vocabulary
            SET translator_result = ?1, similarity_score = ?2, status = ?3, updated_at = ?4
            WHERE id = ?5
            ",
            params![translator_result, similarity_score, status.as_str(), now, id],
        )
        .context("failed to update entry with validation result")?;

        tx.commit().context("failed to commit validation result")
    }

    /// Applies a corrected translation and appends a history row.
    pub fn append_correction(
        &mut self,
        id: i64,
        new_translation: &str,
        correction_source: &str,
    ) -> Result<StoredEntry> {
        let entry = self
            .get(id)?
            .with_context(|| format!("entry {id} not found"))?;

        let now = now_utc_string();
        let tx = self
            .conn
            .transaction()
            .context("failed to start correction transaction")?;

        tx.execute(
            "
            INSERT INTO corrections(vocabulary_id, old_translation, new_translation, correction_source, created_at)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ",
            params![id, entry.effective_translation(), new_translation, correction_source, now],
        )
        .context("failed to insert correction")?;

        tx.execute(
            "
            UPDATE vocabulary
            SET corrected_translation = ?1, status = ?2, updated_at = ?3
            WHERE id = ?4
            ",
            params![new_translation, EntryStatus::Corrected.as_str(), now, id],
        )
        .context("failed to apply correction")?;

        tx.commit().context("failed to commit correction")?;
        Ok(entry)
    }

    /// Entries as deck rows, corrected translations preferred, ordered by
    /// source then id. An empty status slice exports everything.
    pub fn export_rows(&self, statuses: &[EntryStatus]) -> Result<Vec<Entry>> {
        let mut sql = String::from("SELECT * FROM vocabulary");
        let mut bindings: Vec<String> = Vec::new();

        if !statuses.is_empty() {
            let placeholders = vec!["?"; statuses.len()].join(",");
            sql.push_str(&format!(" WHERE status IN ({placeholders})"));
            bindings.extend(statuses.iter().map(|status| status.as_str().to_string()));
        }
        sql.push_str(" ORDER BY source_file, id");

        let mut statement = self
            .conn
            .prepare(&sql)
            .context("failed to prepare export query")?;
        let rows = statement
            .query_map(params_from_iter(bindings.iter()), row_to_entry)
            .context("failed to run export query")?;

        let mut entries = Vec::new();
        for row in rows {
            let stored = row.context("failed to read export row")?;
            entries.push(Entry::new(
                stored.headword.clone(),
                stored.effective_translation().to_string(),
            ));
        }
        Ok(entries)
    }

    /// The most recently touched entry, if any.
    pub fn latest_entry(&self) -> Result<Option<StoredEntry>> {
        self.conn
            .query_row(
                "SELECT * FROM vocabulary ORDER BY updated_at DESC, id DESC LIMIT 1",
                [],
                row_to_entry,
            )
            .optional()
            .context("failed to load latest entry")
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let total = self
            .conn
            .query_row("SELECT COUNT(*) FROM vocabulary", [], |row| row.get(0))
            .context("failed to count entries")?;

        let by_status = self.grouped_counts("status")?;
        let by_source = self.grouped_counts("source_file")?;

        let corrections = self
            .conn
            .query_row("SELECT COUNT(*) FROM corrections", [], |row| row.get(0))
            .context("failed to count corrections")?;

        Ok(StoreStats {
            total,
            by_status,
            by_source,
            corrections,
        })
    }

    fn grouped_counts(&self, column: &str) -> Result<Vec<(String, i64)>> {
        let sql = format!(
            "SELECT COALESCE({column}, ''), COUNT(*) AS cnt FROM vocabulary GROUP BY {column} ORDER BY cnt DESC"
        );
        let mut statement = self
            .conn
            .prepare(&sql)
            .context("failed to prepare grouped count query")?;
        let rows = statement
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .context("failed to run grouped count query")?;

        let mut counts = Vec::new();
        for row in rows {
            counts.push(row.context("failed to read grouped count row")?);
        }
        Ok(counts)
    }
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    Ok(())
}

fn ensure_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS vocabulary (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          headword TEXT NOT NULL,
          translation TEXT NOT NULL,
          corrected_translation TEXT,
          source_language TEXT NOT NULL DEFAULT 'en',
          target_language TEXT NOT NULL DEFAULT 'de',
          source_file TEXT,
          status TEXT NOT NULL DEFAULT 'pending',
          similarity_score REAL,
          translator_result TEXT,
          ocr_context TEXT,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS corrections (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          vocabulary_id INTEGER NOT NULL,
          old_translation TEXT,
          new_translation TEXT NOT NULL,
          correction_source TEXT NOT NULL,
          created_at TEXT NOT NULL,
          FOREIGN KEY (vocabulary_id) REFERENCES vocabulary(id)
        );

        CREATE TABLE IF NOT EXISTS validation_results (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          vocabulary_id INTEGER NOT NULL,
          translator_result TEXT,
          similarity_score REAL,
          validated_at TEXT NOT NULL,
          FOREIGN KEY (vocabulary_id) REFERENCES vocabulary(id)
        );

        CREATE INDEX IF NOT EXISTS idx_vocabulary_status ON vocabulary(status);
        CREATE INDEX IF NOT EXISTS idx_vocabulary_source ON vocabulary(source_file);
        CREATE INDEX IF NOT EXISTS idx_vocabulary_headword ON vocabulary(headword);
        ",
    )
    .context("failed to initialize database schema")?;

    let now = now_utc_string();
    conn.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )
    .context("failed to record schema version")?;
    conn.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )
    .context("failed to record update timestamp")?;

    Ok(())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: row.get("id")?,
        headword: row.get("headword")?,
        translation: row.get("translation")?,
        corrected_translation: row.get("corrected_translation")?,
        source_language: row.get("source_language")?,
        target_language: row.get("target_language")?,
        source_file: row.get("source_file")?,
        status: row.get("status")?,
        similarity_score: row.get("similarity_score")?,
        translator_result: row.get("translator_result")?,
        ocr_context: row.get("ocr_context")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_entry() -> (VocabStore, i64) {
        let mut store = VocabStore::open_in_memory().expect("open store");
        let inserted = store
            .insert_if_absent(
                &Entry::new("personality", "Persönlichkeit"),
                "en",
                "de",
                "unit-1",
                Some("personality [ann] Persönlichkeit"),
            )
            .expect("insert entry");
        assert!(inserted);

        let id = store
            .find_id("personality", "unit-1")
            .expect("find id")
            .expect("id present");
        (store, id)
    }

    #[test]
    fn insert_if_absent_skips_existing_headword_source_pairs() {
        let (mut store, _id) = store_with_entry();

        let inserted_again = store
            .insert_if_absent(
                &Entry::new("personality", "different text"),
                "en",
                "de",
                "unit-1",
                None,
            )
            .expect("insert entry");
        assert!(!inserted_again);

        let other_source = store
            .insert_if_absent(
                &Entry::new("personality", "Persönlichkeit"),
                "en",
                "de",
                "unit-2",
                None,
            )
            .expect("insert entry");
        assert!(other_source);
    }

    #[test]
    fn new_entries_start_pending() {
        let (store, id) = store_with_entry();
        let entry = store.get(id).expect("get").expect("present");
        assert_eq!(entry.status, "pending");
        assert!(entry.corrected_translation.is_none());
    }

    #[test]
    fn correction_updates_entry_and_keeps_history() {
        let (mut store, id) = store_with_entry();

        store
            .append_correction(id, "die Persönlichkeit", "manual")
            .expect("correct entry");

        let entry = store.get(id).expect("get").expect("present");
        assert_eq!(entry.status, "corrected");
        assert_eq!(entry.corrected_translation.as_deref(), Some("die Persönlichkeit"));
        assert_eq!(entry.effective_translation(), "die Persönlichkeit");

        let history: i64 = store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM corrections WHERE vocabulary_id = ?1",
                params![id],
                |row| row.get(0),
            )
            .expect("count corrections");
        assert_eq!(history, 1);
    }

    #[test]
    fn validation_is_recorded_and_mirrored() {
        let (mut store, id) = store_with_entry();

        store
            .record_validation(id, Some("Persönlichkeit"), 0.92, EntryStatus::Valid)
            .expect("record validation");

        let entry = store.get(id).expect("get").expect("present");
        assert_eq!(entry.status, "valid");
        assert_eq!(entry.similarity_score, Some(0.92));
        assert_eq!(entry.translator_result.as_deref(), Some("Persönlichkeit"));
    }

    #[test]
    fn export_prefers_corrected_translations_and_filters_status() {
        let (mut store, id) = store_with_entry();
        store
            .insert_if_absent(&Entry::new("dog", "der Hund"), "en", "de", "unit-1", None)
            .expect("insert second entry");
        store
            .append_correction(id, "die Persönlichkeit", "manual")
            .expect("correct entry");

        let corrected_only = store
            .export_rows(&[EntryStatus::Corrected])
            .expect("export corrected");
        assert_eq!(
            corrected_only,
            vec![Entry::new("personality", "die Persönlichkeit")]
        );

        let everything = store.export_rows(&[]).expect("export all");
        assert_eq!(everything.len(), 2);
    }

    #[test]
    fn list_filters_by_status_and_source() {
        let (mut store, id) = store_with_entry();
        store
            .insert_if_absent(&Entry::new("dog", "der Hund"), "en", "de", "unit-2", None)
            .expect("insert second entry");
        store.update_status(id, EntryStatus::Suspicious).expect("update status");

        let suspicious = store
            .list(&EntryQuery {
                status: Some(EntryStatus::Suspicious),
                source: None,
                limit: 10,
            })
            .expect("list suspicious");
        assert_eq!(suspicious.len(), 1);
        assert_eq!(suspicious[0].headword, "personality");

        let unit2 = store
            .list(&EntryQuery {
                status: None,
                source: Some("unit-2".to_string()),
                limit: 0,
            })
            .expect("list by source");
        assert_eq!(unit2.len(), 1);
        assert_eq!(unit2[0].headword, "dog");
    }

    #[test]
    fn stats_count_by_status_and_source() {
        let (mut store, _id) = store_with_entry();
        store
            .insert_if_absent(&Entry::new("dog", "der Hund"), "en", "de", "unit-2", None)
            .expect("insert second entry");

        let stats = store.stats().expect("stats");
        assert_eq!(stats.total, 2);
        assert_eq!(stats.corrections, 0);
        assert!(stats.by_status.iter().any(|(status, count)| status == "pending" && *count == 2));
        assert_eq!(stats.by_source.len(), 2);
    }
}
