//! Usage frequency lookups from the Google Books Ngram Viewer
//!
//! The viewer's JSON endpoint returns, for each matching ngram, a time series
//! of yearly relative frequencies over the requested year window. We
//! summarize this series into its mean.

use crate::{config::QueryConfig, Occurrence, Result};
use anyhow::Context;
use reqwest::StatusCode;
use serde::Deserialize;

/// Ngram Viewer JSON endpoint
pub const DEFAULT_ENDPOINT: &str = "https://books.google.com/ngrams/json";

/// Something that can tell how frequently a word is used
///
/// Lookups are best-effort: failures are reported as a missing statistic.
#[allow(async_fn_in_trait)]
pub trait OccurrenceSource {
    /// Look up the usage frequency of a word
    async fn lookup(&mut self, word: &str) -> Option<Occurrence>;
}

/// Ngram Viewer client
#[derive(Clone, Debug)]
pub struct NgramClient {
    /// Underlying HTTP client
    client: reqwest::Client,

    /// Query parameters and retry policy
    config: QueryConfig,
}
//
impl NgramClient {
    /// Set up an Ngram Viewer client
    pub fn new(config: QueryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("setting up the HTTP client")?;
        Ok(Self { client, config })
    }

    /// Query the usage frequency of a word, waiting out rate limits
    ///
    /// Any failure other than rate limiting is logged and reported as a
    /// missing statistic.
    pub async fn lookup(&self, word: &str) -> Option<Occurrence> {
        match self.try_lookup(word).await {
            Ok(occurrence) => occurrence,
            Err(e) => {
                log::warn!("Recording {word:?} as missing after a failed lookup: {e:#}");
                None
            }
        }
    }

    /// Query the usage frequency of a word, propagating errors
    async fn try_lookup(&self, word: &str) -> Result<Option<Occurrence>> {
        // Send the request until it is not rate-limited anymore
        let context = || format!("querying the usage frequency of {word:?}");
        let params = self.config.query_params(word);
        let response = loop {
            let response = self
                .client
                .get(&*self.config.endpoint)
                .query(&params)
                .send()
                .await
                .with_context(context)?;
            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                break response;
            }
            log::warn!(
                "Rate-limited while looking up {word:?}, retrying in {:?}",
                self.config.retry_delay
            );
            tokio::time::sleep(self.config.retry_delay).await;
        };

        // Decode the time series
        let series = response
            .error_for_status()
            .with_context(context)?
            .json::<Vec<NgramSeries>>()
            .await
            .with_context(|| format!("decoding the usage frequency of {word:?}"))?;
        let occurrence = mean_occurrence(word, &series);
        log::debug!("Usage frequency of {word:?} is {occurrence:?}");
        Ok(occurrence)
    }
}
//
impl OccurrenceSource for NgramClient {
    async fn lookup(&mut self, word: &str) -> Option<Occurrence> {
        NgramClient::lookup(self, word).await
    }
}

/// Time series from the Ngram Viewer's JSON output
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NgramSeries {
    /// Ngram that the series is about
    pub ngram: String,

    /// Relative frequency on each year of the requested window
    pub timeseries: Vec<f64>,
}

/// Mean usage frequency from the Ngram Viewer's output for a word
///
/// Prefers the series for the exact word, falls back to the first series.
/// Returns `None` when there is no usable data.
pub fn mean_occurrence(word: &str, series: &[NgramSeries]) -> Option<Occurrence> {
    let Some(series) = series.iter().find(|s| s.ngram == word).or(series.first()) else {
        log::debug!("No usage data for {word:?}");
        return None;
    };
    if series.timeseries.is_empty() {
        log::debug!("Empty time series for {word:?}");
        return None;
    }
    let mean = series.timeseries.iter().sum::<f64>() / series.timeseries.len() as f64;
    mean.is_finite().then_some(mean.max(0.0))
}
