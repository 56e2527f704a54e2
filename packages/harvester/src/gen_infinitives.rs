//! Generation of the infinitives list from the dictionary itself.
//!
//! Entry ids have the form `A9<letter><number>`, numbered from 1 within
//! each initial letter. The generator walks the ids of every letter until
//! the dictionary answers 404, keeps the entries whose grammatical category
//! is a verb and appends their infinitive to `gen_infs/infinitives.txt`.
//! Progress is stored in `gen_infs/counters.json`, so an interrupted run
//! resumes where it stopped.

use std::collections::{BTreeMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::ops::RangeInclusive;
use std::path::Path;

use conjugaison_parser::{MarkupNode, ParsedPage};
use indicatif::ProgressBar;

use crate::cache::write_atomic;
use crate::config::{HarvestConfig, COUNTERS_FILE, GEN_INFINITIVES_FILE};
use crate::error::Result;
use crate::harvester::{read_infinitives, Throttle};
use crate::http::DictionaryClient;

/// Initial letters of dictionary entries.
pub const LETTERS: RangeInclusive<char> = 'A'..='Z';

/// Counter value of a letter whose entries have all been visited.
pub const COUNTER_DONE: i64 = -1;

/// Counters are saved at least every this many entries.
const SAVE_EVERY: i64 = 100;

/// A run stops after this many failed requests in a row.
const MAX_CONSECUTIVE_FAILURES: u32 = 10;

/// Last visited entry number per letter.
pub type Counters = BTreeMap<String, i64>;

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenSummary {
    /// Entry ids requested, 404 answers included.
    pub visited: usize,
    pub verbs: usize,
    /// Verbs already present in the output file.
    pub duplicates: usize,
    pub failed: usize,
    pub letters_done: usize,
}

/// Entry id of the `number`-th entry of `letter`.
///
/// # Examples
/// ```
/// use conjugaison_harvester::gen_infinitives::entry_id;
///
/// assert_eq!(entry_id("P", 492), "A9P0492");
/// assert_eq!(entry_id("B", 12345), "A9B12345");
/// ```
#[must_use]
pub fn entry_id(letter: &str, number: i64) -> String {
    format!("A9{letter}{number:04}")
}

/// Load the counters file, starting every missing letter at zero.
pub fn load_counters(path: &Path) -> Result<Counters> {
    let mut counters: Counters = if path.exists() {
        serde_json::from_str(&fs::read_to_string(path)?)?
    } else {
        Counters::new()
    };
    for letter in LETTERS {
        counters.entry(letter.to_string()).or_insert(0);
    }
    Ok(counters)
}

fn save_counters(path: &Path, counters: &Counters) -> Result<()> {
    write_atomic(path, &serde_json::to_string_pretty(counters)?)?;
    tracing::debug!(path = %path.display(), "Saved counters");
    Ok(())
}

/// The infinitive of a dictionary article, if the entry is a verb.
///
/// The category is read from `span.s_cat` inside the entry element;
/// adverbs are rejected even though their category contains "verbe".
/// The infinitive is the lowercased `h1` of the article heading, with
/// the pronominal "(s')" marker removed.
pub fn article_infinitive(html: &str, entry_id: &str) -> Option<String> {
    let page = ParsedPage::parse(html);
    let Ok(entry) = page.entry_root(entry_id) else {
        tracing::warn!(entry_id, "Failed to find content for entry");
        return None;
    };

    let category = entry
        .find_descendant("span", "s_cat")?
        .text_content()
        .trim()
        .to_lowercase();
    if !category.contains("verbe") || category.contains("adverbe") {
        return None;
    }

    let heading = page
        .root()
        .find_descendant("div", "s_Entree_haut")
        .and_then(|div| div.find_tag("h1"))?
        .text_content();
    let infinitive = heading
        .trim()
        .to_lowercase()
        .replace(" (s’)", "")
        .replace(" (s')", "");

    Some(infinitive).filter(|infinitive| !infinitive.is_empty())
}

/// Walk the dictionary and append every verb infinitive to the output file.
///
/// # Arguments
/// * `config` - Validated harvest configuration
/// * `progress` - Spinner advanced once per requested entry
pub fn generate_infinitives(config: &HarvestConfig, progress: &ProgressBar) -> Result<GenSummary> {
    let dir = config.gen_infs_dir();
    fs::create_dir_all(&dir)?;
    let counters_path = dir.join(COUNTERS_FILE);
    let output_path = dir.join(GEN_INFINITIVES_FILE);

    let mut counters = load_counters(&counters_path)?;
    let mut known: HashSet<String> = if output_path.exists() {
        read_infinitives(&output_path)?.into_iter().collect()
    } else {
        HashSet::new()
    };
    let mut output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&output_path)?;

    let mut client = DictionaryClient::new(config.clone())?;
    client.ensure_session()?;
    let mut throttle = Throttle::new(config.requests_delay_ms);
    let mut prev_entry: Option<String> = None;
    let mut summary = GenSummary::default();

    for letter in LETTERS.map(String::from) {
        let mut number = counters.get(&letter).copied().unwrap_or_default();
        if number == COUNTER_DONE {
            tracing::info!(letter = %letter, "All entries already processed");
            summary.letters_done += 1;
            continue;
        }

        tracing::info!(letter = %letter, "Querying infinitives");
        progress.set_message(letter.clone());
        let mut found = 0usize;
        let mut failures = 0u32;

        loop {
            number += 1;
            counters.insert(letter.clone(), number);
            let id = entry_id(&letter, number);

            throttle.wait();
            progress.inc(1);
            summary.visited += 1;

            let html = match client.fetch_article(&id, prev_entry.as_deref()) {
                Ok(Some(html)) => {
                    failures = 0;
                    html
                }
                Ok(None) => {
                    tracing::info!(letter = %letter, verbs = found, "Finished querying letter");
                    counters.insert(letter.clone(), COUNTER_DONE);
                    save_counters(&counters_path, &counters)?;
                    summary.letters_done += 1;
                    break;
                }
                Err(e) => {
                    tracing::warn!(entry_id = %id, error = %e, "Failed to get entry, skipping");
                    summary.failed += 1;
                    failures += 1;
                    if failures >= MAX_CONSECUTIVE_FAILURES {
                        counters.insert(letter.clone(), number - i64::from(failures));
                        save_counters(&counters_path, &counters)?;
                        return Err(e);
                    }
                    continue;
                }
            };
            prev_entry = Some(id.clone());

            if number % SAVE_EVERY == 0 {
                save_counters(&counters_path, &counters)?;
            }

            let Some(infinitive) = article_infinitive(&html, &id) else {
                continue;
            };
            if !known.insert(infinitive.clone()) {
                tracing::debug!(verb = %infinitive, entry_id = %id, "Infinitive already listed");
                summary.duplicates += 1;
                continue;
            }

            writeln!(output, "{infinitive}")?;
            tracing::debug!(verb = %infinitive, entry_id = %id, "Found verb infinitive");
            found += 1;
            summary.verbs += 1;
            save_counters(&counters_path, &counters)?;

            if found % 10 == 0 {
                tracing::info!(letter = %letter, verbs = found, "Found verbs so far");
            }
        }
    }

    Ok(summary)
}
