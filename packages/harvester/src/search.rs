//! Decoding of dictionary search results.

use serde::Deserialize;

use crate::cache::LookupResult;

/// Suffixes marking pronominal entries in search labels.
const PRONOMINAL_SUFFIXES: [&str; 3] = [" (s’)", " (s')", " (se)"];

/// Body of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub result: Vec<SearchHit>,
}

/// One search result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub label: String,
    /// Grammatical nature, e.g. `v. tr.` or `n. m.`.
    #[serde(default)]
    pub nature: String,
}

impl SearchHit {
    fn is_verb(&self) -> bool {
        self.nature.contains("v.")
    }

    /// The label without its pronominal marker.
    fn bare_label(&self) -> String {
        PRONOMINAL_SUFFIXES
            .iter()
            .fold(self.label.clone(), |label, suffix| label.replace(suffix, ""))
    }

    /// Entry id: last segment of the result URL.
    fn entry_id(&self) -> Option<&str> {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
    }
}

/// Pick the entry of `verb` among search results.
///
/// Only verb entries whose label, stripped of its pronominal marker,
/// equals the infinitive are accepted; the first one wins.
///
/// # Examples
/// ```
/// use conjugaison_harvester::cache::LookupResult;
/// use conjugaison_harvester::search::{resolve_entry, SearchResponse};
///
/// let json = r#"{"result":[
///     {"url":"/article/A9P0491","label":"parler","nature":"n. m."},
///     {"url":"/article/A9P0492","label":"parler","nature":"v. intr. et tr."}
/// ]}"#;
/// let response: SearchResponse = serde_json::from_str(json).unwrap();
/// assert_eq!(
///     resolve_entry("parler", &response),
///     LookupResult::Found { entry_id: "A9P0492".to_string(), nature: "v. intr. et tr.".to_string() }
/// );
/// ```
#[must_use]
pub fn resolve_entry(verb: &str, response: &SearchResponse) -> LookupResult {
    if response.result.is_empty() {
        tracing::warn!(verb, "No search results");
        return LookupResult::NotFound;
    }

    let found = response
        .result
        .iter()
        .filter(|hit| hit.is_verb() && hit.bare_label() == verb)
        .find_map(|hit| {
            hit.entry_id().map(|id| LookupResult::Found {
                entry_id: id.to_string(),
                nature: hit.nature.clone(),
            })
        });

    found.unwrap_or_else(|| {
        tracing::warn!(verb, hits = response.result.len(), "No exact verb match in search results");
        LookupResult::NotFound
    })
}
