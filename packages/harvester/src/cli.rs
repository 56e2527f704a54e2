//! Command-line interface for the harvester.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use conjugaison_parser::conjugate_html;

use crate::cache::Cache;
use crate::config::{
    validate_output_dir, HarvestConfig, DEFAULT_MAX_RETRY, DEFAULT_MAX_THREADS,
    DEFAULT_REQUESTS_DELAY_MS, DEFAULT_USER_AGENT, DICTIONARY_URL,
};
use crate::error::Result;
use crate::export::{export, ExportOptions};
use crate::gen_infinitives::generate_infinitives;
use crate::harvester::crawl;

/// Conjugaison Harvester - Collect French verb conjugations from the
/// Académie française dictionary.
#[derive(Parser)]
#[command(name = "conjugaison-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable informational logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search, download and parse every verb of the infinitives file, then merge.
    Crawl(CrawlArgs),

    /// Parse one downloaded conjugation page and print its records as JSON.
    Parse {
        /// Path to the HTML page
        html: PathBuf,

        /// Infinitive of the verb
        #[arg(long)]
        verb: String,

        /// Dictionary entry id (e.g., A9P0492)
        #[arg(long)]
        entry_id: String,

        /// Grammatical nature from the dictionary search
        #[arg(long, default_value = "v.")]
        nature: String,
    },

    /// Merge parsed fragments into verbs.json and verbs.min.json.
    Merge {
        /// Output directory holding the parsed fragments
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        exports: ExportArgs,
    },

    /// Walk every dictionary entry id and list the verb infinitives.
    ///
    /// Writes gen_infs/infinitives.txt under the output directory and
    /// resumes from gen_infs/counters.json.
    GenInfinitives(ConnectionArgs),
}

/// Optional export files.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportArgs {
    /// Also write conjugations.jsonl and participles.jsonl
    #[arg(long)]
    pub gen_rows: bool,

    /// Also write the verbs.db SQLite database
    #[arg(long)]
    pub gen_sqlite3: bool,
}

impl From<ExportArgs> for ExportOptions {
    fn from(args: ExportArgs) -> Self {
        Self {
            gen_rows: args.gen_rows,
            gen_sqlite: args.gen_sqlite3,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct CrawlArgs {
    /// File with one infinitive per line
    #[arg(short, long, default_value = "infinitives.txt")]
    pub infinitives: PathBuf,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Ignore cached lookups and pages and always fetch
    #[arg(long)]
    pub ignore_cache: bool,

    /// Parse workers
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_THREADS)]
    pub max_threads: usize,

    #[command(flatten)]
    pub exports: ExportArgs,
}

/// Output directory and dictionary connection settings.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConnectionArgs {
    /// Output directory for cache, fragments and exports
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Dictionary root URL
    #[arg(long, default_value = DICTIONARY_URL)]
    pub base_url: String,

    /// Overwrite the user agent string
    #[arg(long, value_name = "AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Reuse this JSESSIONID instead of requesting one
    #[arg(long, value_name = "ID")]
    pub jsession_id: Option<String>,

    /// Attempts per HTTP request
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_RETRY)]
    pub max_retry: u32,

    /// Delay between HTTP requests in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_REQUESTS_DELAY_MS)]
    pub requests_delay: u64,
}

impl ConnectionArgs {
    /// Build and validate a configuration with default crawl settings.
    pub fn to_config(&self) -> Result<HarvestConfig> {
        validate_output_dir(&self.output)?;
        HarvestConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            jsession_id: self.jsession_id.clone(),
            max_retry: self.max_retry,
            requests_delay_ms: self.requests_delay,
            output_dir: self.output.clone(),
            ..HarvestConfig::default()
        }
        .validate()
    }
}

impl CrawlArgs {
    /// Build and validate the harvest configuration.
    pub fn to_config(&self) -> Result<HarvestConfig> {
        HarvestConfig {
            max_threads: self.max_threads,
            ignore_cache: self.ignore_cache,
            infinitives: self.infinitives.clone(),
            ..self.connection.to_config()?
        }
        .validate()
    }
}

/// Run the CLI.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Crawl(args) => crawl_command(&args),
        Commands::Parse {
            html,
            verb,
            entry_id,
            nature,
        } => parse_command(&html, &verb, &entry_id, &nature),
        Commands::Merge { output, exports } => merge_command(&output, exports.into()),
        Commands::GenInfinitives(args) => gen_infinitives_command(&args),
    }
}

/// Execute the crawl command.
fn crawl_command(args: &CrawlArgs) -> Result<()> {
    let config = args.to_config()?;

    println!(
        "{} {} into {}",
        style("Harvesting").bold(),
        style(config.infinitives.display()).cyan(),
        style(config.output_dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new(0);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:>8} [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let summary = match crawl(&config, &pb) {
        Ok(summary) => summary,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    println!("  Verbs: {}", summary.total);
    println!("  Parsed: {}", style(summary.parsed).green());
    println!("  Already parsed: {}", summary.already_parsed);
    println!("  Not found: {}", summary.not_found);
    println!("  No data: {}", summary.no_data);
    if summary.parse_failed > 0 {
        println!("  Parse failures: {}", style(summary.parse_failed).red().bold());
    }
    if summary.fetch_failed > 0 {
        println!("  Fetch failures: {}", style(summary.fetch_failed).yellow().bold());
    }

    merge_command(&config.output_dir, args.exports.into())
}

/// Execute the gen-infinitives command.
fn gen_infinitives_command(args: &ConnectionArgs) -> Result<()> {
    let config = args.to_config()?;
    let dir = config.gen_infs_dir();

    println!(
        "{} dictionary entries into {}",
        style("Walking").bold(),
        style(dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} letter {msg} {pos} entries")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = generate_infinitives(&config, &pb);
    pb.finish_and_clear();
    let summary = result?;

    println!("  Entries visited: {}", summary.visited);
    println!("  Verbs found: {}", style(summary.verbs).green());
    println!("  Already listed: {}", summary.duplicates);
    println!("  Letters completed: {}/26", summary.letters_done);
    if summary.failed > 0 {
        println!("  Failed requests: {}", style(summary.failed).yellow().bold());
    }
    Ok(())
}

/// Execute the parse command.
fn parse_command(html: &Path, verb: &str, entry_id: &str, nature: &str) -> Result<()> {
    let content = fs::read_to_string(html)?;
    match conjugate_html(&content, verb, entry_id, nature)? {
        Some(parsed) => {
            let entries: crate::export::VerbMap = parsed.into_entries().into_iter().collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        None => {
            eprintln!(
                "{} no conjugation data for {}",
                style("Warning:").yellow().bold(),
                style(verb).cyan()
            );
        }
    }
    Ok(())
}

/// Execute the merge command.
fn merge_command(output: &Path, options: ExportOptions) -> Result<()> {
    let config = HarvestConfig {
        output_dir: output.to_path_buf(),
        ..HarvestConfig::default()
    };
    let report = export(&Cache::new(&config), output, options)?;

    println!();
    println!("{} {} verbs", style("Merged").green().bold(), report.verbs);
    for file in &report.files {
        println!("  {}", file.display());
    }
    Ok(())
}
