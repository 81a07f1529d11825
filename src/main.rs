//! This program builds a dataset of Wordle words annotated with their usage
//! frequency in the Google Books Ngram dataset, whose viewer you can find at
//! <https://books.google.com/ngrams>.

mod cache;
mod config;
mod dataset;
mod ngrams;
mod progress;
mod source;

use crate::{config::Config, ngrams::NgramClient, progress::ProgressReport, source::WordLists};
use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use std::{num::NonZeroUsize, path::PathBuf};

/// Annotate the Wordle word list and answers with Google Books Ngram usage
/// frequencies
///
/// Frequencies are fetched one word at a time and recorded in a cache file as
/// they come in, so an interrupted run can be resumed by starting the program
/// again with the same cache. Once every word has a record, the final dataset
/// is written as CSV with columns word, occurrence and day.
#[derive(Parser, Debug)]
#[command(version, author)]
struct Args {
    /// Vendored Wordle script which embeds the word list and answers as array
    /// literals
    source: PathBuf,

    /// Line of the source script (starting at 1) which holds the word list,
    /// i.e. valid guesses that are never answers
    #[arg(long, default_value = "1")]
    word_list_line: NonZeroUsize,

    /// Line of the source script (starting at 1) which holds the answers, in
    /// puzzle day order
    #[arg(long, default_value = "2")]
    answers_line: NonZeroUsize,

    /// Tab-separated record of the usage frequencies fetched so far
    ///
    /// Delete this file to start fetching from scratch.
    #[arg(short, long, default_value = "occurrences.tsv")]
    cache: PathBuf,

    /// Final comma-separated dataset
    #[arg(short, long, default_value = "words.csv")]
    output: PathBuf,

    /// Ngram Viewer JSON endpoint
    #[arg(long, default_value = ngrams::DEFAULT_ENDPOINT)]
    endpoint: Box<str>,

    /// First year of the window over which usage frequencies are averaged
    #[arg(long, default_value = "2000")]
    year_start: Year,

    /// Last year of the window over which usage frequencies are averaged
    ///
    /// The 2019 corpus does not go past 2019.
    #[arg(long, default_value = "2019")]
    year_end: Year,

    /// Ngram Viewer corpus identifier, e.g. "en-2019" or "en-US-2019"
    #[arg(long, default_value = "en-2019")]
    corpus: Box<str>,

    /// Ngram Viewer smoothing factor
    ///
    /// Smoothing averages each year with its neighbours, which does not change
    /// much once we average over the whole window anyway.
    #[arg(long, default_value = "0")]
    smoothing: u32,

    /// Seconds to wait before retrying a request which was rate-limited
    #[arg(long, default_value = "5")]
    retry_delay: u64,

    /// Do not fetch anything, build the dataset from the cache as it is
    ///
    /// This fails if some words have not been fetched yet.
    #[arg(long, default_value_t = false)]
    offline: bool,
}
//
impl Args {
    /// Decode and validate CLI arguments
    pub fn parse_and_check() -> Result<Self> {
        Args::parse().check()
    }

    /// Check CLI arguments for basic sanity
    fn check(self) -> Result<Self> {
        anyhow::ensure!(
            self.year_start <= self.year_end,
            "requested year window starts after it ends"
        );
        anyhow::ensure!(
            self.word_list_line != self.answers_line,
            "word list and answers cannot be extracted from the same line"
        );
        anyhow::ensure!(
            self.cache != self.output,
            "the cache file and the output file must be different"
        );
        Ok(self)
    }
}
//
#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging
    setup_logging().map_err(|e| anyhow::format_err!("{e}"))?;

    // Decode CLI arguments
    let config = Config::new(Args::parse_and_check()?);

    // Extract the words of interest from the vendored script
    let words = WordLists::load(&config.source)?;
    log::info!(
        "Extracted {} words, including {} answers, from {}",
        words.len(),
        words.answers.len(),
        config.source.path.display()
    );

    // Fetch usage frequencies for all words that aren't cached yet
    if !config.offline {
        let report = ProgressReport::new();
        let mut client = NgramClient::new(config.query.clone())?;
        let fetched = cache::update(&config.cache_path, words.universe(), &mut client, &report).await?;
        log::info!("Fetched usage frequencies for {fetched} new words");
    }

    // Join the cached frequencies with the word lists and export the result
    let records = cache::load(&config.cache_path).await?;
    let rows = dataset::assemble(&words, records)?;
    dataset::export(&config.output_path, &rows)
        .await
        .with_context(|| format!("exporting the dataset to {}", config.output_path.display()))?;
    log::info!("Wrote {} rows to {}", rows.len(), config.output_path.display());
    Ok(())
}

/// Use anyhow for Result type erasure
pub use anyhow::Result;

/// Lowercase Wordle word
pub type Word = Box<str>;

/// Year of Gregorian Calendar
pub type Year = u16;

/// Zero-based index of the puzzle day where an answer comes up
pub type Day = usize;

/// Mean usage frequency of a word over the year window of interest
pub type Occurrence = f64;

/// Set up logging
fn setup_logging() -> syslog::Result<()> {
    syslog::init(
        syslog::Facility::LOG_USER,
        if cfg!(feature = "log-trace") {
            LevelFilter::Trace
        } else if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(args: &[&str]) -> Result<Args> {
        Args::try_parse_from(["wordle-occurrences", "wordle.js"].iter().chain(args))?.check()
    }

    #[test]
    fn defaults_are_accepted() {
        let args = check(&[]).unwrap();
        assert_eq!(args.word_list_line.get(), 1);
        assert_eq!(args.answers_line.get(), 2);
        assert_eq!(args.year_start, 2000);
        assert_eq!(args.year_end, 2019);
        assert_eq!(args.cache, PathBuf::from("occurrences.tsv"));
        assert_eq!(args.output, PathBuf::from("words.csv"));
        assert!(!args.offline);
    }

    #[test]
    fn reversed_year_window_is_rejected() {
        let err = check(&["--year-start", "2010", "--year-end", "2005"]).unwrap_err();
        assert!(err.to_string().contains("year window"));
        assert!(check(&["--year-start", "2010", "--year-end", "2010"]).is_ok());
    }

    #[test]
    fn shared_source_line_is_rejected() {
        let err = check(&["--word-list-line", "3", "--answers-line", "3"]).unwrap_err();
        assert!(err.to_string().contains("same line"));
    }

    #[test]
    fn cache_cannot_be_the_output() {
        let err = check(&["--cache", "data.csv", "--output", "data.csv"]).unwrap_err();
        assert!(err.to_string().contains("must be different"));
    }
}
