//! Merging of parsed fragments and export of the final files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use conjugaison_parser::rows::{conjugation_rows, participle_rows};
use conjugaison_parser::types::VerbRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::cache::{write_atomic, Cache};
use crate::config::{CONJUGATIONS_FILE, PARTICIPLES_FILE, VERBS_FILE, VERBS_MIN_FILE};
use crate::error::Result;
use crate::sqlite::write_sqlite;

/// Every verb record, keyed by infinitive.
pub type VerbMap = BTreeMap<String, VerbRecord>;

/// Optional outputs of an export, besides `verbs.json` and `verbs.min.json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write `conjugations.jsonl` and `participles.jsonl`.
    pub gen_rows: bool,
    /// Write the `verbs.db` SQLite database.
    pub gen_sqlite: bool,
}

/// Files written by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub verbs: usize,
    pub files: Vec<PathBuf>,
}

/// Merge every parsed fragment into one map.
///
/// Fragments are read in file-name order; an infinitive present in two
/// fragments keeps the later record.
pub fn merge_fragments(cache: &Cache) -> Result<VerbMap> {
    let mut verbs = VerbMap::new();

    for path in cache.fragment_paths()? {
        let content = fs::read_to_string(&path)?;
        let fragment: VerbMap = serde_json::from_str(&content)?;
        for (infinitive, record) in fragment {
            if verbs.insert(infinitive.clone(), record).is_some() {
                tracing::warn!(verb = %infinitive, path = %path.display(), "Duplicate verb in fragments, keeping last");
            }
        }
    }

    tracing::info!(count = verbs.len(), "Merged parsed fragments");
    Ok(verbs)
}

/// Serialize with four-space indentation.
fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Serialize items as JSON lines.
fn to_json_lines<T: Serialize>(items: &[T]) -> Result<String> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

/// Write `verbs.json` (indented) and `verbs.min.json` (compact).
pub fn write_verbs(output_dir: &Path, verbs: &VerbMap) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let pretty = output_dir.join(VERBS_FILE);
    write_atomic(&pretty, &to_pretty_json(verbs)?)?;

    let compact = output_dir.join(VERBS_MIN_FILE);
    write_atomic(&compact, &serde_json::to_string(verbs)?)?;

    Ok(vec![pretty, compact])
}

/// Write the relational rows as `conjugations.jsonl` and `participles.jsonl`.
pub fn write_rows(output_dir: &Path, verbs: &VerbMap) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;

    let mut conjugations = Vec::new();
    let mut participles = Vec::new();
    for (infinitive, record) in verbs {
        conjugations.extend(conjugation_rows(infinitive, record));
        participles.extend(participle_rows(infinitive, record));
    }
    tracing::info!(
        conjugations = conjugations.len(),
        participles = participles.len(),
        "Generated relational rows"
    );

    let conjugations_path = output_dir.join(CONJUGATIONS_FILE);
    write_atomic(&conjugations_path, &to_json_lines(&conjugations)?)?;

    let participles_path = output_dir.join(PARTICIPLES_FILE);
    write_atomic(&participles_path, &to_json_lines(&participles)?)?;

    Ok(vec![conjugations_path, participles_path])
}

/// Merge fragments and write every requested export file.
pub fn export(cache: &Cache, output_dir: &Path, options: ExportOptions) -> Result<ExportReport> {
    let verbs = merge_fragments(cache)?;
    let mut files = write_verbs(output_dir, &verbs)?;
    if options.gen_rows {
        files.extend(write_rows(output_dir, &verbs)?);
    }
    if options.gen_sqlite {
        files.push(write_sqlite(output_dir, &verbs)?.path);
    }
    Ok(ExportReport {
        verbs: verbs.len(),
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HarvestConfig, SQLITE_FILE};
    use conjugaison_parser::types::{Mood, ParsedVerb, Person, Tense, Voice, VoiceRecord};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn parsed(verb: &str, form: &str) -> ParsedVerb {
        let mut voice = VoiceRecord::default();
        voice
            .mood_mut(Mood::Indicative)
            .entry(Tense::Present)
            .or_default()
            .insert(Person::FirstSingular, form.to_string());
        voice.participe.present = Some(format!("{form}nt"));
        let mut record = VerbRecord::default();
        record.set_voice(Voice::ActiveAvoir, voice);
        ParsedVerb {
            infinitive: verb.to_string(),
            record,
            reform_variant: None,
        }
    }

    fn setup() -> (tempfile::TempDir, Cache) {
        let dir = tempdir().unwrap();
        let config = HarvestConfig {
            output_dir: dir.path().to_path_buf(),
            ..HarvestConfig::default()
        };
        let cache = Cache::new(&config);
        cache.ensure_dirs().unwrap();
        (dir, cache)
    }

    #[test]
    fn test_merge_fragments_sorted() {
        let (_dir, cache) = setup();
        cache.write_fragment(parsed("parler", "parle")).unwrap();
        cache.write_fragment(parsed("aimer", "aime")).unwrap();

        let verbs = merge_fragments(&cache).unwrap();
        assert_eq!(verbs.keys().cloned().collect::<Vec<_>>(), vec!["aimer", "parler"]);
    }

    #[test]
    fn test_export_writes_all_files() {
        let (dir, cache) = setup();
        cache.write_fragment(parsed("parler", "parle")).unwrap();

        let options = ExportOptions {
            gen_rows: true,
            gen_sqlite: true,
        };
        let report = export(&cache, dir.path(), options).unwrap();
        assert_eq!(report.verbs, 1);
        assert_eq!(report.files.len(), 5);
        assert!(dir.path().join(SQLITE_FILE).exists());

        let pretty = fs::read_to_string(dir.path().join(VERBS_FILE)).unwrap();
        assert!(pretty.contains("\n    \"parler\": {"));
        let compact = fs::read_to_string(dir.path().join(VERBS_MIN_FILE)).unwrap();
        assert!(!compact.contains('\n'));
        assert_eq!(
            serde_json::from_str::<VerbMap>(&pretty).unwrap(),
            serde_json::from_str::<VerbMap>(&compact).unwrap()
        );

        let rows = fs::read_to_string(dir.path().join(CONJUGATIONS_FILE)).unwrap();
        let row: serde_json::Value = serde_json::from_str(rows.lines().next().unwrap()).unwrap();
        assert_eq!(row["verb"], "parler");
        assert_eq!(row["voice"], "ACTIVE_AVOIR");
        assert_eq!(row["person"], "1s");
        assert_eq!(row["conjugation"], "parle");

        let participles = fs::read_to_string(dir.path().join(PARTICIPLES_FILE)).unwrap();
        assert_eq!(participles.lines().count(), 1);
    }

    #[test]
    fn test_export_without_rows() {
        let (dir, cache) = setup();
        let report = export(&cache, dir.path(), ExportOptions::default()).unwrap();
        assert_eq!(report.verbs, 0);
        assert_eq!(report.files.len(), 2);
        assert!(!dir.path().join(CONJUGATIONS_FILE).exists());
        assert!(!dir.path().join(SQLITE_FILE).exists());
        assert_eq!(fs::read_to_string(dir.path().join(VERBS_MIN_FILE)).unwrap(), "{}");
    }
}
