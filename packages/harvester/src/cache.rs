//! On-disk cache and resume bookkeeping.
//!
//! Layout under the output directory:
//!
//! - `cache/<verb>.txt`: lookup result (`<entry id>\t<nature>` or a sentinel)
//! - `cache/<verb>.html`: downloaded conjugation page
//! - `parsed/<verb>.json`: parsed records of the verb, ready to merge

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use conjugaison_parser::types::{ParsedVerb, VerbRecord};

use crate::config::HarvestConfig;
use crate::error::Result;

/// Cache line of a verb the dictionary does not know.
pub const NOT_FOUND_SENTINEL: &str = "NOT_FOUND_SKIPPED";

/// Cache line of a verb whose page could not be parsed.
pub const PARSE_FAILED_SENTINEL: &str = "PARSE_FAILED";

/// Outcome of looking a verb up in the dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The verb has a dictionary entry.
    Found { entry_id: String, nature: String },
    /// No verb entry matches the infinitive.
    NotFound,
    /// The entry exists but its page could not be parsed.
    ParseFailed,
}

impl LookupResult {
    /// Serialize to one cache line.
    #[must_use]
    pub fn to_cache_line(&self) -> String {
        match self {
            Self::Found { entry_id, nature } => format!("{entry_id}\t{nature}"),
            Self::NotFound => NOT_FOUND_SENTINEL.to_string(),
            Self::ParseFailed => PARSE_FAILED_SENTINEL.to_string(),
        }
    }

    /// Parse a cache line; `None` when the line is malformed.
    ///
    /// # Examples
    /// ```
    /// use conjugaison_harvester::cache::LookupResult;
    ///
    /// assert_eq!(LookupResult::from_cache_line("PARSE_FAILED"), Some(LookupResult::ParseFailed));
    /// assert_eq!(
    ///     LookupResult::from_cache_line("A9P0492\tv. intr."),
    ///     Some(LookupResult::Found { entry_id: "A9P0492".into(), nature: "v. intr.".into() })
    /// );
    /// assert_eq!(LookupResult::from_cache_line(""), None);
    /// ```
    #[must_use]
    pub fn from_cache_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            NOT_FOUND_SENTINEL => Some(Self::NotFound),
            PARSE_FAILED_SENTINEL => Some(Self::ParseFailed),
            _ => {
                let (entry_id, nature) = line.split_once('\t')?;
                let entry_id = entry_id.trim();
                if entry_id.is_empty() {
                    return None;
                }
                Some(Self::Found {
                    entry_id: entry_id.to_string(),
                    nature: nature.trim().to_string(),
                })
            }
        }
    }
}

/// File name stem for a verb; path separators are replaced.
fn file_stem(verb: &str) -> String {
    verb.replace(['/', '\\'], "_")
}

/// Write a file through a temporary sibling and rename it into place.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(())
}

/// Per-verb files of one output directory.
#[derive(Debug, Clone)]
pub struct Cache {
    cache_dir: PathBuf,
    parsed_dir: PathBuf,
}

impl Cache {
    #[must_use]
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            cache_dir: config.cache_dir(),
            parsed_dir: config.parsed_dir(),
        }
    }

    /// Create the cache and parsed directories.
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::create_dir_all(&self.parsed_dir)?;
        Ok(())
    }

    fn lookup_path(&self, verb: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.txt", file_stem(verb)))
    }

    #[must_use]
    pub fn html_path(&self, verb: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.html", file_stem(verb)))
    }

    #[must_use]
    pub fn fragment_path(&self, verb: &str) -> PathBuf {
        self.parsed_dir.join(format!("{}.json", file_stem(verb)))
    }

    /// Read the cached lookup result of a verb.
    ///
    /// A malformed cache file is reported and treated as absent.
    pub fn read_lookup(&self, verb: &str) -> Result<Option<LookupResult>> {
        let path = self.lookup_path(verb);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        let result = LookupResult::from_cache_line(content.trim());
        if result.is_none() {
            tracing::warn!(verb, path = %path.display(), "Malformed lookup cache, ignoring it");
        }
        Ok(result)
    }

    pub fn write_lookup(&self, verb: &str, result: &LookupResult) -> Result<()> {
        write_atomic(&self.lookup_path(verb), &result.to_cache_line())
    }

    /// Read the cached conjugation page of a verb.
    pub fn read_html(&self, verb: &str) -> Result<Option<String>> {
        let path = self.html_path(verb);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    pub fn write_html(&self, verb: &str, html: &str) -> Result<()> {
        write_atomic(&self.html_path(verb), html)
    }

    #[must_use]
    pub fn has_fragment(&self, verb: &str) -> bool {
        self.fragment_path(verb).exists()
    }

    /// Store the records of one parsed verb under its infinitive.
    pub fn write_fragment(&self, parsed: ParsedVerb) -> Result<PathBuf> {
        let path = self.fragment_path(&parsed.infinitive);
        let entries: BTreeMap<String, VerbRecord> = parsed.into_entries().into_iter().collect();
        write_atomic(&path, &serde_json::to_string(&entries)?)?;
        Ok(path)
    }

    /// Parsed fragment files, sorted by file name.
    pub fn fragment_paths(&self) -> Result<Vec<PathBuf>> {
        if !self.parsed_dir.exists() {
            return Ok(Vec::new());
        }
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.parsed_dir)? {
            let path = entry?.path();
            let is_fragment = path.extension().is_some_and(|ext| ext == "json")
                && !path
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy().starts_with('.'));
            if is_fragment {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn cache_in(dir: &Path) -> Cache {
        let config = HarvestConfig {
            output_dir: dir.to_path_buf(),
            ..HarvestConfig::default()
        };
        let cache = Cache::new(&config);
        cache.ensure_dirs().unwrap();
        cache
    }

    #[test]
    fn test_lookup_round_trip_per_state() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        assert_eq!(cache.read_lookup("parler").unwrap(), None);

        for result in [
            LookupResult::Found {
                entry_id: "A9P0492".to_string(),
                nature: "v. intr. et tr.".to_string(),
            },
            LookupResult::NotFound,
            LookupResult::ParseFailed,
        ] {
            cache.write_lookup("parler", &result).unwrap();
            assert_eq!(cache.read_lookup("parler").unwrap(), Some(result));
        }
    }

    #[test]
    fn test_sentinels_are_not_entry_ids() {
        assert_eq!(
            LookupResult::from_cache_line("NOT_FOUND_SKIPPED"),
            Some(LookupResult::NotFound)
        );
        assert_eq!(LookupResult::from_cache_line("A9P0492"), None);
        assert_eq!(LookupResult::from_cache_line("\tv. tr."), None);
    }

    #[test]
    fn test_malformed_cache_is_absent() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());
        fs::write(dir.path().join("cache").join("aller.txt"), "garbage").unwrap();
        assert_eq!(cache.read_lookup("aller").unwrap(), None);
    }

    #[test]
    fn test_html_cache() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        assert_eq!(cache.read_html("aller").unwrap(), None);
        cache.write_html("aller", "<html></html>").unwrap();
        assert_eq!(cache.read_html("aller").unwrap().as_deref(), Some("<html></html>"));
    }

    #[test]
    fn test_fragments_sorted_and_temp_files_skipped() {
        let dir = tempdir().unwrap();
        let cache = cache_in(dir.path());

        for verb in ["parler", "aller"] {
            cache
                .write_fragment(ParsedVerb {
                    infinitive: verb.to_string(),
                    record: VerbRecord::default(),
                    reform_variant: None,
                })
                .unwrap();
        }
        fs::write(dir.path().join("parsed").join(".finir.json.tmp"), "{}").unwrap();

        let names: Vec<String> = cache
            .fragment_paths()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["aller.json", "parler.json"]);
        assert!(cache.has_fragment("aller"));
        assert!(!cache.has_fragment("finir"));
    }

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem("a/b\\c"), "a_b_c");
    }
}
