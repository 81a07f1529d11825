//! Resumable on-disk record of the usage frequencies fetched so far
//!
//! Fetching usage frequencies takes one rate-limited request per word, which
//! adds up to hours for the full Wordle word list. Therefore, every lookup
//! result is appended to a tab-separated cache file as soon as it is known,
//! and later runs only fetch the words that are not recorded there yet.
//!
//! Lookups that failed are recorded with an empty occurrence field, so that
//! they are not retried either. Delete the cache file to start over.

use crate::{
    ngrams::OccurrenceSource,
    progress::ProgressReport,
    Occurrence, Result, Word,
};
use anyhow::Context;
use csv_async::{AsyncReaderBuilder, AsyncWriterBuilder};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    io::{ErrorKind, SeekFrom},
    path::Path,
};
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};

/// Column names of the cache file
const HEADER: [&str; 2] = ["word", "occurrence"];

/// Field delimiter of the cache file
const DELIMITER: u8 = b'\t';

/// Entry from the cache file
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CacheRecord {
    /// Word whose usage frequency was looked up
    pub word: Word,

    /// Outcome of the lookup, if it succeeded
    pub occurrence: Option<Occurrence>,
}

/// Load all records from the cache file, if it exists
pub async fn load(path: &Path) -> Result<Vec<CacheRecord>> {
    let context = || format!("loading cached usage frequencies from {}", path.display());
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No cache at {}, starting from scratch", path.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e).with_context(context),
    };
    let mut records = AsyncReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .create_deserializer(file)
        .into_deserialize::<CacheRecord>();
    let mut result = Vec::new();
    while let Some(record) = records.next().await {
        result.push(record.with_context(context)?);
    }
    log::debug!("Loaded {} cached records from {}", result.len(), path.display());
    Ok(result)
}

/// Fetch and record the usage frequency of every word that is not cached yet
///
/// Words are looked up in the order of the `universe` iterator. Returns the
/// number of words that were looked up.
pub async fn update<'universe>(
    path: &Path,
    universe: impl IntoIterator<Item = &'universe str>,
    source: &mut impl OccurrenceSource,
    report: &ProgressReport,
) -> Result<usize> {
    let context = || format!("appending to the cache at {}", path.display());

    // Figure out which words still need to be looked up
    let cached = load(path).await?;
    let cached = cached
        .iter()
        .map(|record| &*record.word)
        .collect::<HashSet<_>>();
    let remaining = universe
        .into_iter()
        .filter(|word| !cached.contains(word))
        .collect::<Vec<_>>();
    log::info!(
        "{} words already cached, {} left to look up",
        cached.len(),
        remaining.len()
    );

    // Open the cache file for appending, writing the header if it's new and
    // terminating the last record if it was saved without a final newline
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .await
        .with_context(context)?;
    let len = file.metadata().await.with_context(context)?.len();
    if len == 0 {
        let header = format!("{}\n", HEADER.join(&char::from(DELIMITER).to_string()));
        file.write_all(header.as_bytes()).await.with_context(context)?;
        file.flush().await.with_context(context)?;
    } else {
        file.seek(SeekFrom::End(-1)).await.with_context(context)?;
        if file.read_u8().await.with_context(context)? != b'\n' {
            log::debug!("Terminating the unfinished last line of {}", path.display());
            file.write_all(b"\n").await.with_context(context)?;
            file.flush().await.with_context(context)?;
        }
    }
    if remaining.is_empty() {
        return Ok(0);
    }
    let mut writer = AsyncWriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .create_serializer(file);

    // Look up remaining words, recording each result as soon as it comes in
    let progress = report.add("Looking up usage frequencies", remaining.len());
    for word in remaining {
        let record = CacheRecord {
            word: word.into(),
            occurrence: source.lookup(word).await,
        };
        log::trace!("Recording {record:?}");
        writer.serialize(&record).await.with_context(context)?;
        writer.flush().await.with_context(context)?;
        progress.make_progress(word);
    }
    Ok(progress.position() as usize)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Canned usage frequencies which remember what was looked up
    #[derive(Debug, Default)]
    pub struct FakeSource {
        /// Answer to each lookup, missing words are unavailable
        pub occurrences: HashMap<&'static str, Occurrence>,

        /// Words that were looked up, in order
        pub lookups: Vec<String>,
    }
    //
    impl FakeSource {
        pub fn new(occurrences: &[(&'static str, Occurrence)]) -> Self {
            Self {
                occurrences: occurrences.iter().copied().collect(),
                lookups: Vec::new(),
            }
        }
    }
    //
    impl OccurrenceSource for FakeSource {
        async fn lookup(&mut self, word: &str) -> Option<Occurrence> {
            self.lookups.push(word.to_owned());
            self.occurrences.get(word).copied()
        }
    }

    const UNIVERSE: [&str; 3] = ["abcde", "bcdef", "cdefg"];

    fn fake_source() -> FakeSource {
        FakeSource::new(&[("abcde", 0.1), ("cdefg", 0.2)])
    }

    fn record(word: &str, occurrence: Option<Occurrence>) -> CacheRecord {
        CacheRecord {
            word: word.into(),
            occurrence,
        }
    }

    #[tokio::test]
    async fn missing_cache_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("occurrences.tsv")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_records_every_word() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        let mut source = fake_source();
        let fetched = update(&path, UNIVERSE, &mut source, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(fetched, 3);
        assert_eq!(source.lookups, UNIVERSE);
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "word\toccurrence\nabcde\t0.1\nbcdef\t\ncdefg\t0.2\n"
        );
        assert_eq!(
            load(&path).await.unwrap(),
            vec![
                record("abcde", Some(0.1)),
                record("bcdef", None),
                record("cdefg", Some(0.2)),
            ]
        );
    }

    #[tokio::test]
    async fn update_resumes_partial_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        let report = ProgressReport::hidden();

        // Interrupted run which only got through the first word
        let mut source = fake_source();
        update(&path, UNIVERSE[..1].iter().copied(), &mut source, &report)
            .await
            .unwrap();
        assert_eq!(source.lookups, ["abcde"]);

        // Resumed run only looks up the rest
        let mut source = fake_source();
        let fetched = update(&path, UNIVERSE, &mut source, &report).await.unwrap();
        assert_eq!(fetched, 2);
        assert_eq!(source.lookups, ["bcdef", "cdefg"]);

        // Finished run has nothing left to do
        let mut source = fake_source();
        assert_eq!(update(&path, UNIVERSE, &mut source, &report).await.unwrap(), 0);
        assert!(source.lookups.is_empty());
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "word\toccurrence\nabcde\t0.1\nbcdef\t\ncdefg\t0.2\n"
        );
    }

    #[tokio::test]
    async fn missing_lookups_are_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        tokio::fs::write(&path, "word\toccurrence\nbcdef\t\n").await.unwrap();
        let mut source = fake_source();
        update(&path, UNIVERSE, &mut source, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(source.lookups, ["abcde", "cdefg"]);
    }

    #[tokio::test]
    async fn unterminated_last_record_is_kept_intact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        tokio::fs::write(&path, "word\toccurrence\nabcde\t0.1").await.unwrap();
        let mut source = fake_source();
        update(&path, UNIVERSE, &mut source, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(source.lookups, ["bcdef", "cdefg"]);
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "word\toccurrence\nabcde\t0.1\nbcdef\t\ncdefg\t0.2\n"
        );
        assert_eq!(
            load(&path).await.unwrap(),
            vec![
                record("abcde", Some(0.1)),
                record("bcdef", None),
                record("cdefg", Some(0.2)),
            ]
        );
    }

    #[tokio::test]
    async fn empty_universe_still_creates_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        let mut source = fake_source();
        let fetched = update(&path, std::iter::empty(), &mut source, &ProgressReport::hidden())
            .await
            .unwrap();
        assert_eq!(fetched, 0);
        assert!(source.lookups.is_empty());
        assert_eq!(
            tokio::fs::read_to_string(&path).await.unwrap(),
            "word\toccurrence\n"
        );
        assert!(load(&path).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occurrences.tsv");
        tokio::fs::write(&path, "word\toccurrence\nabcde\tlots\n").await.unwrap();
        let err = load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("occurrences.tsv"));
    }
}
