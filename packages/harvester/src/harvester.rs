//! Main harvester service that ties all components together.
//!
//! A crawl has two phases. The fetch phase walks the infinitives in order,
//! resolving each verb's dictionary entry and downloading its conjugation
//! page, one request at a time. The parse phase then parses the cached
//! pages in parallel and stores one JSON fragment per verb.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use conjugaison_parser::conjugate_html;
use indicatif::ProgressBar;

use crate::cache::{Cache, LookupResult};
use crate::config::HarvestConfig;
use crate::error::Result;
use crate::http::DictionaryClient;

/// A verb whose page is cached and waiting to be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseJob {
    pub verb: String,
    pub entry_id: String,
    pub nature: String,
}

/// Result of parsing one cached page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Records were written to the parsed directory.
    Parsed,
    /// The page holds no conjugation data.
    NoData,
    /// The page could not be parsed.
    Failed(String),
}

/// Counters reported at the end of a crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub total: usize,
    /// Verbs already parsed by an earlier run.
    pub already_parsed: usize,
    pub parsed: usize,
    pub not_found: usize,
    pub no_data: usize,
    pub parse_failed: usize,
    /// Verbs skipped after a network error; retried on the next run.
    pub fetch_failed: usize,
}

/// Read infinitives, one per line; blank lines are skipped.
pub fn read_infinitives(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Spaces network requests `delay` apart.
pub(crate) struct Throttle {
    delay: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub(crate) fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last: None,
        }
    }

    pub(crate) fn wait(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                thread::sleep(self.delay - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Run a full crawl: fetch every infinitive, then parse the cached pages.
///
/// # Arguments
/// * `config` - Validated harvest configuration
/// * `progress` - Progress bar advanced once per verb in each phase
///
/// # Returns
/// Counters describing what happened to each verb
pub fn crawl(config: &HarvestConfig, progress: &ProgressBar) -> Result<CrawlSummary> {
    let cache = Cache::new(config);
    cache.ensure_dirs()?;

    let verbs = read_infinitives(&config.infinitives)?;
    tracing::info!(count = verbs.len(), path = %config.infinitives.display(), "Loaded infinitives");

    let mut summary = CrawlSummary {
        total: verbs.len(),
        ..CrawlSummary::default()
    };

    progress.set_length(verbs.len() as u64);
    progress.set_message("Fetching");
    let mut client = DictionaryClient::new(config.clone())?;
    let jobs = fetch_phase(config, &cache, &mut client, &verbs, &mut summary, progress)?;

    progress.set_position(0);
    progress.set_length(jobs.len() as u64);
    progress.set_message("Parsing");
    for (verb, outcome) in parse_phase(&cache, &jobs, config.max_threads, progress) {
        match outcome {
            ParseOutcome::Parsed => summary.parsed += 1,
            ParseOutcome::NoData => summary.no_data += 1,
            ParseOutcome::Failed(message) => {
                tracing::warn!(verb = %verb, error = %message, "Failed to parse conjugation page");
                summary.parse_failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Resolve and download every verb that is not parsed yet.
///
/// Network failures skip the verb without caching anything, so the next
/// run retries it. Only local IO errors abort the phase.
fn fetch_phase(
    config: &HarvestConfig,
    cache: &Cache,
    client: &mut DictionaryClient,
    verbs: &[String],
    summary: &mut CrawlSummary,
    progress: &ProgressBar,
) -> Result<Vec<ParseJob>> {
    let mut jobs = Vec::new();
    let mut throttle = Throttle::new(config.requests_delay_ms);
    let mut prev_entry: Option<String> = None;

    for verb in verbs {
        progress.inc(1);

        if !config.ignore_cache && cache.has_fragment(verb) {
            tracing::debug!(verb = %verb, "Already parsed, skipping");
            summary.already_parsed += 1;
            continue;
        }

        let cached = if config.ignore_cache {
            None
        } else {
            cache.read_lookup(verb)?
        };

        let lookup = match cached {
            Some(result) => result,
            None => {
                throttle.wait();
                match client
                    .ensure_session()
                    .and_then(|()| client.search_entry(verb, prev_entry.as_deref()))
                {
                    Ok(result) => {
                        cache.write_lookup(verb, &result)?;
                        result
                    }
                    Err(e) => {
                        tracing::warn!(verb = %verb, error = %e, "Search failed, skipping");
                        summary.fetch_failed += 1;
                        continue;
                    }
                }
            }
        };

        let (entry_id, nature) = match lookup {
            LookupResult::Found { entry_id, nature } => (entry_id, nature),
            LookupResult::NotFound => {
                tracing::info!(verb = %verb, "Not in dictionary, skipping");
                summary.not_found += 1;
                continue;
            }
            LookupResult::ParseFailed => {
                tracing::info!(verb = %verb, "Parsing failed in an earlier run, skipping");
                summary.parse_failed += 1;
                continue;
            }
        };

        let has_page = !config.ignore_cache && cache.html_path(verb).exists();
        if !has_page {
            throttle.wait();
            match client.download_conjugation(&entry_id, prev_entry.as_deref()) {
                Ok(html) => cache.write_html(verb, &html)?,
                Err(e) => {
                    tracing::warn!(verb = %verb, error = %e, "Download failed, skipping");
                    summary.fetch_failed += 1;
                    continue;
                }
            }
        }

        prev_entry = Some(entry_id.clone());
        jobs.push(ParseJob {
            verb: verb.clone(),
            entry_id,
            nature,
        });
    }

    Ok(jobs)
}

/// Parse one cached page and record the outcome in the cache.
pub fn parse_job(cache: &Cache, job: &ParseJob) -> ParseOutcome {
    let (lookup, outcome) = match parse_and_store(cache, job) {
        Ok(true) => return ParseOutcome::Parsed,
        Ok(false) => {
            tracing::warn!(verb = %job.verb, "No conjugation data found");
            (LookupResult::NotFound, ParseOutcome::NoData)
        }
        Err(e) => (LookupResult::ParseFailed, ParseOutcome::Failed(e.to_string())),
    };

    if let Err(e) = cache.write_lookup(&job.verb, &lookup) {
        tracing::warn!(verb = %job.verb, error = %e, "Failed to record parse outcome");
    }
    outcome
}

fn parse_and_store(cache: &Cache, job: &ParseJob) -> Result<bool> {
    let Some(html) = cache.read_html(&job.verb)? else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("no cached page for '{}'", job.verb),
        )
        .into());
    };

    match conjugate_html(&html, &job.verb, &job.entry_id, &job.nature)? {
        Some(parsed) => {
            let path = cache.write_fragment(parsed)?;
            tracing::debug!(verb = %job.verb, path = %path.display(), "Stored parsed records");
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Parse jobs on `max_threads` workers.
///
/// Workers pull jobs from a shared index; each page is parsed by exactly
/// one worker. Outcomes are returned in completion order.
pub fn parse_phase(
    cache: &Cache,
    jobs: &[ParseJob],
    max_threads: usize,
    progress: &ProgressBar,
) -> Vec<(String, ParseOutcome)> {
    let next = AtomicUsize::new(0);
    let workers = max_threads.min(jobs.len()).max(1);
    let (tx, rx) = mpsc::channel::<(String, ParseOutcome)>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || loop {
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(job) = jobs.get(index) else {
                    break;
                };
                let outcome = parse_job(cache, job);
                if tx.send((job.verb.clone(), outcome)).is_err() {
                    break;
                }
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(jobs.len());
        for result in rx {
            progress.inc(1);
            outcomes.push(result);
        }
        outcomes
    })
}
