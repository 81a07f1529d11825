//! Processing pipeline configuration

use crate::{Args, Year};
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc, time::Duration};

/// Final process configuration
///
/// This is the result of digesting validated [`Args`]. Please refer to
/// [`Args`] to know more about individual fields.
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Config {
    /// Where the word lists come from
    pub source: SourceConfig,

    /// How usage frequencies are queried
    pub query: QueryConfig,

    // Other fields have the same meaning as in Args
    pub cache_path: PathBuf,
    pub output_path: PathBuf,
    pub offline: bool,
}
//
impl Config {
    /// Determine process configuration from CLI arguments
    pub(crate) fn new(args: Args) -> Arc<Self> {
        let Args {
            source,
            word_list_line,
            answers_line,
            cache,
            output,
            endpoint,
            year_start,
            year_end,
            corpus,
            smoothing,
            retry_delay,
            offline,
        } = args;
        Arc::new(Self {
            source: SourceConfig {
                path: source,
                word_list_line,
                answers_line,
            },
            query: QueryConfig {
                endpoint,
                year_start,
                year_end,
                corpus,
                smoothing,
                retry_delay: Duration::from_secs(retry_delay),
            },
            cache_path: cache,
            output_path: output,
            offline,
        })
    }
}

/// Location of the word list and answer array literals
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceConfig {
    /// Vendored script that embeds the arrays
    pub path: PathBuf,

    // 1-based line numbers, same meaning as in Args
    pub word_list_line: NonZeroUsize,
    pub answers_line: NonZeroUsize,
}

/// Subset of the configuration that determines which statistic is fetched
#[allow(missing_docs)]
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QueryConfig {
    // Same meaning as in Args
    pub endpoint: Box<str>,
    pub year_start: Year,
    pub year_end: Year,
    pub corpus: Box<str>,
    pub smoothing: u32,

    /// Fixed delay between a rate-limited request and its retry
    pub retry_delay: Duration,
}
//
impl QueryConfig {
    /// Query parameters for a given word, in the order the Ngram Viewer
    /// documents them
    pub fn query_params(&self, word: &str) -> [(&'static str, String); 5] {
        [
            ("content", word.to_owned()),
            ("year_start", self.year_start.to_string()),
            ("year_end", self.year_end.to_string()),
            ("corpus", self.corpus.to_string()),
            ("smoothing", self.smoothing.to_string()),
        ]
    }
}
