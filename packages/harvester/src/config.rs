//! Configuration constants and validation functions for the harvester.

use std::path::{Path, PathBuf};

use reqwest::Url;

use crate::error::{HarvesterError, Result};

/// Root URL of the Académie française dictionary.
pub const DICTIONARY_URL: &str = "https://dictionnaire-academie.fr/";

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Browser user agent sent by default; the dictionary rejects unknown clients.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15";

/// Default number of attempts per request.
pub const DEFAULT_MAX_RETRY: u32 = 5;

/// Default delay between requests in milliseconds; also the backoff base.
pub const DEFAULT_REQUESTS_DELAY_MS: u64 = 500;

/// Default number of parse workers.
pub const DEFAULT_MAX_THREADS: usize = 4;

pub const HEADER_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
pub const HEADER_ACCEPT_LANGUAGE: &str = "en-GB,en;q=0.9";
pub const HEADER_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// Cookies the site expects besides the session id.
pub const MISC_COOKIES: &str =
    "acceptCookies=1; accessibilitySettings=wordNavigationLink=false&openDyslexic=false";

/// Directory names and file names under the output directory.
pub const CACHE_DIR: &str = "cache";
pub const PARSED_DIR: &str = "parsed";
pub const VERBS_FILE: &str = "verbs.json";
pub const VERBS_MIN_FILE: &str = "verbs.min.json";
pub const CONJUGATIONS_FILE: &str = "conjugations.jsonl";
pub const PARTICIPLES_FILE: &str = "participles.jsonl";
pub const SQLITE_FILE: &str = "verbs.db";

/// Directory and files of the infinitives generator, under the output directory.
pub const GEN_INFS_DIR: &str = "gen_infs";
pub const COUNTERS_FILE: &str = "counters.json";
pub const GEN_INFINITIVES_FILE: &str = "infinitives.txt";

/// Settings of one harvest run, built from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestConfig {
    /// Dictionary root URL, ending with `/`.
    pub base_url: String,
    pub user_agent: String,
    /// Session cookie to reuse instead of requesting a new one.
    pub jsession_id: Option<String>,
    pub max_retry: u32,
    pub requests_delay_ms: u64,
    pub max_threads: usize,
    /// Re-search and re-download verbs even when cached.
    pub ignore_cache: bool,
    pub output_dir: PathBuf,
    /// File with one infinitive per line.
    pub infinitives: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DICTIONARY_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            jsession_id: None,
            max_retry: DEFAULT_MAX_RETRY,
            requests_delay_ms: DEFAULT_REQUESTS_DELAY_MS,
            max_threads: DEFAULT_MAX_THREADS,
            ignore_cache: false,
            output_dir: PathBuf::from("output"),
            infinitives: PathBuf::from("infinitives.txt"),
        }
    }
}

impl HarvestConfig {
    /// Check every value and normalize the base URL to end with `/`.
    ///
    /// # Returns
    /// * `Ok(config)` if every value is usable
    /// * `Err(HarvesterError::InvalidConfig)` naming the first bad value
    ///
    /// # Examples
    /// ```
    /// use conjugaison_harvester::config::HarvestConfig;
    ///
    /// let config = HarvestConfig {
    ///     base_url: "http://localhost:8080".to_string(),
    ///     ..HarvestConfig::default()
    /// };
    /// assert_eq!(config.validate().unwrap().base_url, "http://localhost:8080/");
    ///
    /// let config = HarvestConfig { max_threads: 0, ..HarvestConfig::default() };
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(mut self) -> Result<Self> {
        validate_base_url(&self.base_url)?;
        if !self.base_url.ends_with('/') {
            self.base_url.push('/');
        }
        if self.user_agent.trim().is_empty() {
            return Err(HarvesterError::InvalidConfig(
                "user agent must not be empty".to_string(),
            ));
        }
        if self.max_retry == 0 {
            return Err(HarvesterError::InvalidConfig(
                "max retry must be at least 1".to_string(),
            ));
        }
        validate_max_threads(self.max_threads)?;
        if let Some(id) = &self.jsession_id {
            if id.trim().is_empty() || id.contains(';') {
                return Err(HarvesterError::InvalidConfig(format!(
                    "invalid JSESSIONID '{id}'"
                )));
            }
        }
        Ok(self)
    }

    /// URL of the dictionary search endpoint.
    #[must_use]
    pub fn search_url(&self) -> String {
        format!("{}search", self.base_url)
    }

    /// URL of the conjugation page of an entry.
    #[must_use]
    pub fn conjugation_url(&self, entry_id: &str) -> String {
        format!("{}conjuguer/{entry_id}", self.base_url)
    }

    /// URL of a dictionary article, used as referer.
    #[must_use]
    pub fn article_url(&self, entry_id: &str) -> String {
        format!("{}article/{entry_id}", self.base_url)
    }

    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.output_dir.join(CACHE_DIR)
    }

    #[must_use]
    pub fn parsed_dir(&self) -> PathBuf {
        self.output_dir.join(PARSED_DIR)
    }

    #[must_use]
    pub fn gen_infs_dir(&self) -> PathBuf {
        self.output_dir.join(GEN_INFS_DIR)
    }
}

/// Validate that a base URL is an absolute http(s) URL.
///
/// # Examples
/// ```
/// use conjugaison_harvester::config::validate_base_url;
///
/// assert!(validate_base_url("https://dictionnaire-academie.fr/").is_ok());
/// assert!(validate_base_url("dictionnaire-academie.fr").is_err());
/// ```
pub fn validate_base_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)
        .map_err(|e| HarvesterError::InvalidConfig(format!("invalid base URL '{url}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HarvesterError::InvalidConfig(format!(
            "base URL must use http or https, got '{url}'"
        )));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(HarvesterError::InvalidConfig(format!(
            "base URL has no host: '{url}'"
        )));
    }
    Ok(())
}

/// Validate the number of parse workers.
pub fn validate_max_threads(max_threads: usize) -> Result<()> {
    if max_threads == 0 {
        return Err(HarvesterError::InvalidConfig(
            "max threads must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Validate that the output path is a directory or can become one.
pub fn validate_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.exists() && !output_dir.is_dir() {
        return Err(HarvesterError::InvalidConfig(format!(
            "output path is not a directory: {}",
            output_dir.display()
        )));
    }
    Ok(())
}
