//! Conjugaison Harvester - Collect French verb conjugations from the
//! Académie française dictionary.
//!
//! This crate drives the conjugation parser over the whole dictionary:
//! it looks verbs up, downloads and caches their conjugation pages,
//! parses them in parallel and merges the records into JSON and SQLite
//! exports. It can also build the infinitives list by walking the
//! dictionary's entry ids.
//!
//! # Example
//!
//! ```
//! use conjugaison_harvester::cache::LookupResult;
//! use conjugaison_harvester::config::HarvestConfig;
//!
//! let config = HarvestConfig::default().validate().unwrap();
//! assert_eq!(config.conjugation_url("A9P0492"), "https://dictionnaire-academie.fr/conjuguer/A9P0492");
//! assert_eq!(LookupResult::NotFound.to_cache_line(), "NOT_FOUND_SKIPPED");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Configuration constants and validation
//! - [`error`]: Error types and Result alias
//! - [`http`]: Session-aware HTTP client with retry and backoff
//! - [`search`]: Search result decoding
//! - [`cache`]: On-disk cache and lookup results
//! - [`harvester`]: Fetch and parallel parse phases
//! - [`export`]: Fragment merging and JSON exports
//! - [`sqlite`]: SQLite database export
//! - [`gen_infinitives`]: Infinitives list generation from dictionary entries
//! - [`cli`]: Command-line interface

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod gen_infinitives;
pub mod harvester;
pub mod http;
pub mod search;
pub mod sqlite;

// Re-export main functions
pub use gen_infinitives::generate_infinitives;
pub use harvester::crawl;

// Re-export commonly used items
pub use cache::LookupResult;
pub use config::HarvestConfig;
pub use error::{HarvesterError, Result};
