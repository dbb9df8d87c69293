use std::sync::Arc;

use crate::dictionary::DictionaryPort;
use crate::distance::mismatch_count;
use crate::error::PuzzleError;
use crate::ladder::{normalize, Difficulty};

/// Draws before giving up on finding an end word distinct from the start word.
pub const MAX_PAIR_ATTEMPTS: usize = 5;

/// How many neighbors to ask the dictionary for when building hints. Wide
/// enough to cover a whole neighbourhood so ranking sees every candidate.
pub const NEIGHBOR_LOOKUP_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub start_word: String,
    pub end_word: String,
    pub difficulty: Difficulty,
}

/// Builds random start/end pairs from the dictionary
#[derive(Clone)]
pub struct PuzzleGenerator {
    dictionary: Arc<dyn DictionaryPort>,
}

impl PuzzleGenerator {
    pub fn new(dictionary: Arc<dyn DictionaryPort>) -> Self {
        Self { dictionary }
    }

    pub async fn generate(&self, difficulty: Difficulty) -> Result<Puzzle, PuzzleError> {
        let start_word = self.draw(difficulty).await?;

        for _ in 0..MAX_PAIR_ATTEMPTS {
            let end_word = self.draw(difficulty).await?;
            if end_word != start_word {
                return Ok(Puzzle {
                    start_word,
                    end_word,
                    difficulty,
                });
            }
        }

        Err(PuzzleError::NoDistinctPair {
            difficulty,
            attempts: MAX_PAIR_ATTEMPTS,
        })
    }

    async fn draw(&self, difficulty: Difficulty) -> Result<String, PuzzleError> {
        let length = difficulty.word_length();
        self.dictionary
            .random_word(length, difficulty)
            .await?
            .map(|word| normalize(&word))
            .ok_or(PuzzleError::NoWord { difficulty, length })
    }
}

/// Hints that copy one of the target's letters into the last word, in
/// position order. These are not checked against the dictionary.
pub fn target_hints(last_word: &str, target: &str, limit: usize) -> Vec<String> {
    let last: Vec<char> = last_word.chars().collect();
    target
        .chars()
        .enumerate()
        .filter(|(i, c)| last.get(*i).is_some_and(|l| l != c))
        .map(|(i, c)| {
            let mut hint = last.clone();
            hint[i] = c;
            hint.into_iter().collect::<String>()
        })
        .take(limit)
        .collect()
}

/// Orders dictionary neighbors by distance to the target, closest first,
/// dropping words already used.
pub fn rank_hints(
    neighbors: Vec<String>,
    used: &[&str],
    target: &str,
    limit: usize,
) -> Vec<String> {
    let mut ranked: Vec<String> = neighbors
        .into_iter()
        .map(|word| normalize(&word))
        .filter(|word| !used.contains(&word.as_str()))
        .collect();
    ranked.sort_by_key(|word| mismatch_count(word, target));
    ranked.truncate(limit);
    ranked
}
