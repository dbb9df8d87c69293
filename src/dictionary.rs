//! Dictionary boundary used by both engines.
//!
//! [`DictionaryPort`] is the contract the engines consume: word validation,
//! random words by length and difficulty, and one-letter neighbors for
//! hints. [`WordListDictionary`] serves it from word lists compiled into
//! the binary; [`TimeoutDictionary`] bounds the latency of any other port.

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use include_dir::{include_dir, Dir};
use rand::seq::IteratorRandom;
use serde::Deserialize;
use thiserror::Error;

use crate::ladder::{normalize, Difficulty};

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DictionaryError {
    #[error("dictionary unavailable: {0}")]
    Unavailable(String),
    #[error("dictionary timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait DictionaryPort: Send + Sync {
    /// Case-insensitive membership check.
    async fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError>;

    /// A random word of `length` letters; `None` when nothing matches.
    async fn random_word(
        &self,
        length: usize,
        difficulty: Difficulty,
    ) -> Result<Option<String>, DictionaryError>;

    /// Up to `limit` dictionary words one letter away from `word`, in a
    /// stable order so repeated calls agree.
    async fn neighbor_words(&self, word: &str, limit: usize)
        -> Result<Vec<String>, DictionaryError>;
}

#[async_trait]
impl<T: DictionaryPort + ?Sized> DictionaryPort for Arc<T> {
    async fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        (**self).is_valid_word(word).await
    }

    async fn random_word(
        &self,
        length: usize,
        difficulty: Difficulty,
    ) -> Result<Option<String>, DictionaryError> {
        (**self).random_word(length, difficulty).await
    }

    async fn neighbor_words(
        &self,
        word: &str,
        limit: usize,
    ) -> Result<Vec<String>, DictionaryError> {
        (**self).neighbor_words(word, limit).await
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub difficulty: Difficulty,
    pub length: usize,
    pub size: u32,
    pub words: Vec<String>,
}

/// In-memory dictionary keyed by uppercase word.
#[derive(Debug, Clone, Default)]
pub struct WordListDictionary {
    words: HashMap<String, Difficulty>,
}

impl WordListDictionary {
    /// Dictionary built from the bundled easy/medium/hard lists.
    pub fn embedded() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let mut dictionary = Self::default();
        for difficulty in Difficulty::ALL {
            let list = read_word_list(difficulty)?;
            dictionary.extend(list.words.iter().map(String::as_str), list.difficulty);
        }
        Ok(dictionary)
    }

    pub fn from_words<'a>(
        words: impl IntoIterator<Item = &'a str>,
        difficulty: Difficulty,
    ) -> Self {
        let mut dictionary = Self::default();
        dictionary.extend(words, difficulty);
        dictionary
    }

    pub fn extend<'a>(&mut self, words: impl IntoIterator<Item = &'a str>, difficulty: Difficulty) {
        for word in words {
            let word = normalize(word);
            if !word.is_empty() {
                self.words.insert(word, difficulty);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(&normalize(word))
    }

    /// Every dictionary word reachable from `word` by one substitution, in
    /// position then alphabet order.
    pub fn neighbors(&self, word: &str) -> Vec<String> {
        let word = normalize(word);
        let letters: Vec<char> = word.chars().collect();
        let mut found = Vec::new();

        for i in 0..letters.len() {
            for replacement in ALPHABET.chars() {
                if replacement == letters[i] {
                    continue;
                }
                let mut candidate = letters.clone();
                candidate[i] = replacement;
                let candidate: String = candidate.into_iter().collect();
                if self.words.contains_key(&candidate) {
                    found.push(candidate);
                }
            }
        }

        found
    }
}

#[async_trait]
impl DictionaryPort for WordListDictionary {
    async fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        Ok(self.contains(word))
    }

    async fn random_word(
        &self,
        length: usize,
        difficulty: Difficulty,
    ) -> Result<Option<String>, DictionaryError> {
        let mut rng = rand::thread_rng();
        Ok(self
            .words
            .iter()
            .filter(|(word, word_difficulty)| {
                word.chars().count() == length && **word_difficulty == difficulty
            })
            .map(|(word, _)| word.clone())
            .choose(&mut rng))
    }

    async fn neighbor_words(
        &self,
        word: &str,
        limit: usize,
    ) -> Result<Vec<String>, DictionaryError> {
        let mut found = self.neighbors(word);
        found.truncate(limit);
        Ok(found)
    }
}

/// Wraps a port so no call can hang longer than `timeout`.
#[derive(Debug, Clone)]
pub struct TimeoutDictionary<D> {
    inner: D,
    timeout: Duration,
}

impl<D: DictionaryPort> TimeoutDictionary<D> {
    pub fn new(inner: D, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, DictionaryError>> + Send,
    ) -> Result<T, DictionaryError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "Dictionary call timed out");
                Err(DictionaryError::Timeout(self.timeout))
            }
        }
    }
}

#[async_trait]
impl<D: DictionaryPort> DictionaryPort for TimeoutDictionary<D> {
    async fn is_valid_word(&self, word: &str) -> Result<bool, DictionaryError> {
        self.bounded(self.inner.is_valid_word(word)).await
    }

    async fn random_word(
        &self,
        length: usize,
        difficulty: Difficulty,
    ) -> Result<Option<String>, DictionaryError> {
        self.bounded(self.inner.random_word(length, difficulty)).await
    }

    async fn neighbor_words(
        &self,
        word: &str,
        limit: usize,
    ) -> Result<Vec<String>, DictionaryError> {
        self.bounded(self.inner.neighbor_words(word, limit)).await
    }
}

fn read_word_list(difficulty: Difficulty) -> Result<WordList, Box<dyn Error + Send + Sync>> {
    let file_name = format!("{difficulty}.json");
    let file = WORDS_DIR
        .get_file(&file_name)
        .ok_or_else(|| format!("word list {file_name} not found"))?;
    let contents = file
        .contents_utf8()
        .ok_or_else(|| format!("word list {file_name} is not utf-8"))?;
    Ok(serde_json::from_str(contents)?)
}
