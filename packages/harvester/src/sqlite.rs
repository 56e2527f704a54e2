//! SQLite export of the merged verb records.
//!
//! The database is rebuilt from scratch on every export. It holds three
//! tables: `verbs` for per-verb metadata, `conjugations` with one row per
//! person form and `participles` with one row per participle form. Rows
//! come from the parser's relational decomposition, so the voice column
//! carries the same labels as the JSON-lines export.

use std::fs;
use std::path::{Path, PathBuf};

use conjugaison_parser::rows::{conjugation_rows, participle_rows};
use rusqlite::{params, Connection};

use crate::config::SQLITE_FILE;
use crate::error::Result;
use crate::export::VerbMap;

const SCHEMA: &str = "
    CREATE TABLE verbs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        infinitive TEXT UNIQUE NOT NULL,
        h_aspire BOOLEAN NOT NULL DEFAULT 0,
        rectification_1990 BOOLEAN NOT NULL DEFAULT 0,
        rectification_1990_variante TEXT
    );

    CREATE TABLE conjugations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        verb_id INTEGER NOT NULL,
        voice TEXT NOT NULL,
        mood TEXT NOT NULL,
        tense TEXT NOT NULL,
        person TEXT NOT NULL,
        conjugation TEXT NOT NULL,
        FOREIGN KEY (verb_id) REFERENCES verbs(id) ON DELETE CASCADE,
        UNIQUE(verb_id, voice, mood, tense, person)
    );

    CREATE TABLE participles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        verb_id INTEGER NOT NULL,
        voice TEXT NOT NULL,
        form TEXT NOT NULL,
        participle TEXT NOT NULL,
        FOREIGN KEY (verb_id) REFERENCES verbs(id) ON DELETE CASCADE,
        UNIQUE(verb_id, voice, form)
    );

    CREATE INDEX idx_verbs_variants ON verbs(rectification_1990_variante);
    CREATE INDEX idx_conjugations_search ON conjugations(conjugation);
";

/// Row counts of a database export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteReport {
    pub path: PathBuf,
    pub verbs: usize,
    pub conjugations: usize,
    pub participles: usize,
}

/// Write `verbs.db`, replacing any previous database.
pub fn write_sqlite(output_dir: &Path, verbs: &VerbMap) -> Result<SqliteReport> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SQLITE_FILE);
    if path.exists() {
        fs::remove_file(&path)?;
        tracing::info!(path = %path.display(), "Removed existing database");
    }

    let mut conn = Connection::open(&path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.execute_batch(SCHEMA)?;

    let mut report = SqliteReport {
        path: path.clone(),
        verbs: 0,
        conjugations: 0,
        participles: 0,
    };

    let tx = conn.transaction()?;
    {
        let mut insert_verb = tx.prepare(
            "INSERT INTO verbs (infinitive, h_aspire, rectification_1990, rectification_1990_variante)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        let mut insert_conjugation = tx.prepare(
            "INSERT INTO conjugations (verb_id, voice, mood, tense, person, conjugation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        let mut insert_participle = tx.prepare(
            "INSERT INTO participles (verb_id, voice, form, participle) VALUES (?1, ?2, ?3, ?4)",
        )?;

        for (infinitive, record) in verbs {
            let verb_id = insert_verb.insert(params![
                infinitive,
                record.h_aspire,
                record.rectification_1990,
                record.rectification_1990_variante,
            ])?;
            report.verbs += 1;

            for row in conjugation_rows(infinitive, record) {
                insert_conjugation.execute(params![
                    verb_id,
                    row.voice,
                    row.mood,
                    row.tense,
                    row.person,
                    row.conjugation,
                ])?;
                report.conjugations += 1;
            }
            for row in participle_rows(infinitive, record) {
                insert_participle.execute(params![verb_id, row.voice, row.form, row.participle])?;
                report.participles += 1;
            }

            if report.verbs % 1000 == 0 {
                tracing::info!(verbs = report.verbs, "Loading verbs into database");
            }
        }
    }
    tx.commit()?;

    tracing::info!(
        path = %path.display(),
        verbs = report.verbs,
        conjugations = report.conjugations,
        participles = report.participles,
        "Database generation complete"
    );
    Ok(report)
}
