//! Extraction of the word list and answers from the vendored Wordle script
//!
//! The script embeds both lists as array literals of quoted words, each on a
//! line of its own. This extraction is tied to one bundled snapshot of the
//! script, so anything unexpected is a hard error rather than something we
//! try to work around.

use crate::{config::SourceConfig, Day, Result, Word};
use anyhow::Context;
use std::{
    collections::{HashMap, HashSet},
    num::NonZeroUsize,
};

/// Words of interest, as extracted from the vendored script
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WordLists {
    /// Valid guesses that never come up as answers
    pub word_list: Vec<Word>,

    /// Answers, in puzzle day order
    pub answers: Vec<Word>,
}
//
impl WordLists {
    /// Read the vendored script and extract the word lists from it
    pub fn load(config: &SourceConfig) -> Result<Self> {
        let text = std::fs::read_to_string(&config.path)
            .with_context(|| format!("reading the source script {}", config.path.display()))?;
        Self::extract(&text, config)
            .with_context(|| format!("extracting word lists from {}", config.path.display()))
    }

    /// Extract the word lists from the text of the vendored script
    pub fn extract(text: &str, config: &SourceConfig) -> Result<Self> {
        let word_list = extract_array(text, config.word_list_line).context("extracting the word list")?;
        let answers = extract_array(text, config.answers_line).context("extracting the answers")?;
        let result = Self { word_list, answers };
        result.check()?;
        Ok(result)
    }

    /// Iterate over the full word universe: word list first, then answers
    pub fn universe(&self) -> impl Iterator<Item = &str> + '_ {
        (self.word_list.iter())
            .chain(self.answers.iter())
            .map(|word| &**word)
    }

    /// Number of words in the universe
    pub fn len(&self) -> usize {
        self.word_list.len() + self.answers.len()
    }

    /// Map each answer to the day where it comes up
    pub fn days(&self) -> HashMap<&str, Day> {
        (self.answers.iter().enumerate())
            .map(|(day, word)| (&**word, day))
            .collect()
    }

    /// Check that every word appears only once across both lists
    fn check(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.word_list.len());
        for word in &self.word_list {
            anyhow::ensure!(seen.insert(&**word), "word {word:?} appears twice in the word list");
        }
        let mut seen_answers = HashSet::with_capacity(self.answers.len());
        for word in &self.answers {
            anyhow::ensure!(
                !seen.contains(&**word),
                "answer {word:?} is also in the word list, the two should be disjoint"
            );
            anyhow::ensure!(seen_answers.insert(&**word), "answer {word:?} appears twice");
        }
        Ok(())
    }
}

/// Extract the array literal of quoted words found on a given line (starting
/// at 1) of some text
pub fn extract_array(text: &str, line: NonZeroUsize) -> Result<Vec<Word>> {
    let line_text = text
        .lines()
        .nth(line.get() - 1)
        .with_context(|| format!("source text has no line {line}"))?;

    // The literal lies between the first opening bracket of the line and the
    // closing bracket that follows it
    let (_, after_open) = line_text
        .split_once('[')
        .with_context(|| format!("no array literal starts on line {line}"))?;
    let (contents, _) = after_open
        .split_once(']')
        .with_context(|| format!("array literal on line {line} is not terminated"))?;
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    // Split on separators, tolerating a trailing comma
    let mut elements = contents.split(',').collect::<Vec<_>>();
    if elements.len() > 1 && elements.last().is_some_and(|last| last.trim().is_empty()) {
        elements.pop();
    }
    elements
        .into_iter()
        .enumerate()
        .map(|(idx, element)| {
            let word = unquote(element.trim())
                .with_context(|| format!("element #{idx} of line {line} is not a quoted word: {element:?}"))?;
            anyhow::ensure!(
                !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase()),
                "element #{idx} of line {line} is not a lowercase word: {word:?}"
            );
            log::trace!("Extracted word {word:?} from line {line}");
            Ok(word.into())
        })
        .collect()
}

/// Strip matching single or double quotes around a string literal
fn unquote(element: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        element
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}
