//! HTTP client for the Académie française dictionary.
//!
//! The site expects a browser-like session: a `JSESSIONID` cookie obtained
//! from the root page, a `lastEntry` cookie and referer pointing at the
//! previously visited article, and form-encoded search requests.

use std::sync::LazyLock;
use std::thread;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, COOKIE, REFERER, SET_COOKIE};

use crate::cache::LookupResult;
use crate::config::{
    HarvestConfig, HEADER_ACCEPT, HEADER_ACCEPT_LANGUAGE, HEADER_CONTENT_TYPE, HTTP_TIMEOUT_SECS,
    MISC_COOKIES,
};
use crate::error::{HarvesterError, Result};
use crate::search::{resolve_entry, SearchResponse};

/// Upper bound on the backoff exponent.
const MAX_BACKOFF_SHIFT: u32 = 10;

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static JSESSIONID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"JSESSIONID=([^;]+)").expect("valid regex"));

/// Extract the session id from a `Set-Cookie` header value.
///
/// # Examples
/// ```
/// use conjugaison_harvester::http::extract_jsession_id;
///
/// let header = "JSESSIONID=4F2A9C; Path=/; Secure; HttpOnly";
/// assert_eq!(extract_jsession_id(header).as_deref(), Some("4F2A9C"));
/// assert_eq!(extract_jsession_id("acceptCookies=1"), None);
/// ```
#[must_use]
pub fn extract_jsession_id(set_cookie: &str) -> Option<String> {
    JSESSIONID_RE
        .captures(set_cookie)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Delay before a retry: `base × 2^(attempt-1)`, for attempt ≥ 1.
#[must_use]
pub fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
    base_ms.saturating_mul(1 << shift)
}

/// Session-aware dictionary client.
pub struct DictionaryClient {
    client: Client,
    config: HarvestConfig,
    jsession_id: Option<String>,
}

impl DictionaryClient {
    /// Create a client for the given configuration.
    ///
    /// The session id from the configuration, if any, is reused as is.
    pub fn new(config: HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(config.user_agent.as_str())
            .build()?;
        let jsession_id = config.jsession_id.clone();
        Ok(Self {
            client,
            config,
            jsession_id,
        })
    }

    /// The current session id.
    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.jsession_id.as_deref()
    }

    /// Request a fresh session id from the dictionary root page.
    pub fn obtain_session(&mut self) -> Result<String> {
        let url = self.config.base_url.clone();
        tracing::info!(url = %url, "Requesting session id");

        let response = self.send_with_retry(|| {
            self.client
                .get(&url)
                .header(ACCEPT, HEADER_ACCEPT)
                .header(ACCEPT_LANGUAGE, HEADER_ACCEPT_LANGUAGE)
                .header("Sec-Fetch-Site", "none")
                .header("Sec-Fetch-Mode", "navigate")
                .header("Sec-Fetch-Dest", "document")
        })?;

        if !self.update_session(&response) {
            return Err(HarvesterError::SessionNotFound { url });
        }
        self.jsession_id
            .clone()
            .ok_or(HarvesterError::SessionNotFound { url })
    }

    /// Make sure a session id is available, requesting one if needed.
    pub fn ensure_session(&mut self) -> Result<()> {
        if self.jsession_id.is_none() {
            self.obtain_session()?;
        }
        Ok(())
    }

    /// Search the dictionary for the entry of a verb.
    ///
    /// # Arguments
    /// * `verb` - Infinitive to look up
    /// * `prev_entry` - Entry id of the previously visited article
    ///
    /// # Returns
    /// `LookupResult::Found` for an exact verb match, `LookupResult::NotFound`
    /// otherwise
    pub fn search_entry(&mut self, verb: &str, prev_entry: Option<&str>) -> Result<LookupResult> {
        let url = self.config.search_url();
        let body = format!("term={}&options=1", urlencoding::encode(verb));
        tracing::info!(url = %url, verb, "Searching entry");

        let response = self.send_with_retry(|| {
            self.page_request(self.client.post(&url), prev_entry)
                .header(CONTENT_TYPE, HEADER_CONTENT_TYPE)
                .body(body.clone())
        })?;
        self.update_session(&response);

        let text = response.text()?;
        let results: SearchResponse = serde_json::from_str(&text)?;
        Ok(resolve_entry(verb, &results))
    }

    /// Download the conjugation page of an entry.
    pub fn download_conjugation(&mut self, entry_id: &str, prev_entry: Option<&str>) -> Result<String> {
        let url = self.config.conjugation_url(entry_id);
        tracing::info!(url = %url, "Downloading conjugation page");

        let response = self.send_with_retry(|| self.page_request(self.client.get(&url), prev_entry))?;
        self.update_session(&response);
        Ok(response.text()?)
    }

    /// Download the dictionary article of an entry.
    ///
    /// Returns `None` when the dictionary has no such entry (HTTP 404).
    pub fn fetch_article(&mut self, entry_id: &str, prev_entry: Option<&str>) -> Result<Option<String>> {
        let url = self.config.article_url(entry_id);
        tracing::debug!(url = %url, "Downloading article");

        match self.send_with_retry(|| self.page_request(self.client.get(&url), prev_entry)) {
            Ok(response) => {
                self.update_session(&response);
                Ok(Some(response.text()?))
            }
            Err(HarvesterError::Http(e)) if e.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Headers shared by search and page requests.
    fn page_request(&self, request: RequestBuilder, prev_entry: Option<&str>) -> RequestBuilder {
        let mut cookies = format!(
            "JSESSIONID={}; {MISC_COOKIES}",
            self.jsession_id.as_deref().unwrap_or_default()
        );
        let mut request = request
            .header(ACCEPT, HEADER_ACCEPT)
            .header(ACCEPT_LANGUAGE, HEADER_ACCEPT_LANGUAGE)
            .header("Sec-Fetch-Site", "same-origin")
            .header("Sec-Fetch-Mode", "cors")
            .header("Sec-Fetch-Dest", "empty");
        if let Some(prev) = prev_entry {
            cookies.push_str(&format!("; lastEntry={prev}"));
            request = request.header(REFERER, self.config.article_url(prev));
        }
        request.header(COOKIE, cookies)
    }

    /// Adopt a new session id from the response cookies.
    ///
    /// Returns whether the response carried a session id.
    fn update_session(&mut self, response: &Response) -> bool {
        let found = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(extract_jsession_id);

        match found {
            Some(id) => {
                if self.jsession_id.as_deref() != Some(id.as_str()) {
                    tracing::info!(jsession_id = %id, "Updating session id");
                    self.jsession_id = Some(id);
                }
                true
            }
            None => false,
        }
    }

    /// Send a request with retry logic.
    ///
    /// Uses exponential backoff for transient failures (network errors, 5xx
    /// responses). Client errors (4xx) fail immediately.
    fn send_with_retry<F>(&self, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let max_attempts = self.config.max_retry;
        let mut last_error: Option<String> = None;

        for attempt in 0..max_attempts {
            if attempt > 0 {
                let delay = backoff_delay_ms(self.config.requests_delay_ms, attempt);
                tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
                thread::sleep(Duration::from_millis(delay));
            }

            match build().send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            status = %status,
                            attempt = attempt + 1,
                            max_attempts,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    return Ok(response.error_for_status()?);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            error = %e,
                            attempt = attempt + 1,
                            max_attempts,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(HarvesterError::Http(e));
                }
            }
        }

        Err(HarvesterError::RetriesExhausted {
            attempts: max_attempts,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}
