//! Final dataset: every word of interest with its usage frequency and, for
//! answers, the day where it comes up

use crate::{cache::CacheRecord, source::WordLists, Day, Occurrence, Result, Word};
use anyhow::Context;
use csv_async::AsyncWriterBuilder;
use serde::Serialize;
use std::{
    collections::{hash_map, HashMap},
    path::Path,
};
use tokio::{fs::File, io::AsyncWriteExt};

/// Column names of the output file
const HEADER: [&str; 3] = ["word", "occurrence", "day"];

/// Row of the final dataset
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetRow {
    /// Word from the word list or the answers
    pub word: Word,

    /// Usage frequency, or zero if it could not be looked up
    pub occurrence: Occurrence,

    /// Day where this word is the answer, if it is an answer
    pub day: Option<Day>,
}

/// Join cached usage frequencies with the word lists
///
/// Produces one row per word of the universe, sorted by word. Cached records
/// for words outside of the universe are ignored. Every word of the universe
/// must have a cached record.
pub fn assemble(words: &WordLists, records: Vec<CacheRecord>) -> Result<Vec<DatasetRow>> {
    // Index cached occurrences by word, the first record of a word wins
    let mut occurrences = HashMap::with_capacity(records.len());
    for CacheRecord { word, occurrence } in records {
        match occurrences.entry(word) {
            hash_map::Entry::Occupied(o) => {
                log::warn!("Ignoring duplicate cache record for {:?}", o.key());
            }
            hash_map::Entry::Vacant(v) => {
                v.insert(occurrence);
            }
        }
    }

    // Build one row per word of interest
    let days = words.days();
    let mut uncached = Vec::new();
    let mut rows = (words.universe())
        .filter_map(|word| {
            let Some(occurrence) = occurrences.get(word) else {
                uncached.push(word);
                return None;
            };
            Some(DatasetRow {
                word: word.into(),
                occurrence: normalize(*occurrence),
                day: days.get(word).copied(),
            })
        })
        .collect::<Vec<_>>();
    anyhow::ensure!(
        uncached.is_empty(),
        "{} words have no cached usage frequency yet (e.g. {:?}), run again without --offline to fetch them",
        uncached.len(),
        &uncached[..uncached.len().min(3)]
    );
    if occurrences.len() > rows.len() {
        log::info!(
            "Ignored {} cached records for words that are not in the word lists anymore",
            occurrences.len() - rows.len()
        );
    }

    // Sort rows by word
    rows.sort_unstable_by(|a, b| a.word.cmp(&b.word));
    Ok(rows)
}

/// Turn a cached usage frequency into a dataset one
fn normalize(occurrence: Option<Occurrence>) -> Occurrence {
    occurrence
        .filter(|occurrence| occurrence.is_finite())
        .unwrap_or(0.0)
        .max(0.0)
}

/// Write the dataset to a CSV file, replacing any previous one
pub async fn export(path: &Path, rows: &[DatasetRow]) -> Result<()> {
    let mut file = File::create(path).await.context("creating the output file")?;
    file.write_all(format!("{}\n", HEADER.join(",")).as_bytes())
        .await
        .context("writing the output header")?;
    let mut writer = AsyncWriterBuilder::new()
        .has_headers(false)
        .create_serializer(file);
    for row in rows {
        writer
            .serialize(row)
            .await
            .with_context(|| format!("writing the output row for {:?}", row.word))?;
    }
    writer.flush().await.context("flushing the output file")?;
    Ok(())
}
