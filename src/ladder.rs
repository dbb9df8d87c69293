use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::distance::{are_one_letter_apart, first_difference, mismatch_count};
use crate::error::{MoveError, SetupError};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Length of generated words for this difficulty.
    pub fn word_length(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 5,
        }
    }

    pub fn for_length(length: usize) -> Self {
        match length {
            0..=3 => Difficulty::Easy,
            4 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

/// One rung of the ladder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordItem {
    pub word: String,
    pub is_valid: bool,
    /// Position that differs from the previous rung; `None` for the first rung.
    pub changed_letter_index: Option<usize>,
    /// Only tracked in time attack ladders.
    pub is_optimal_step: Option<bool>,
}

impl WordItem {
    fn seed(word: String) -> Self {
        Self {
            word,
            is_valid: true,
            changed_letter_index: None,
            is_optimal_step: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LadderStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// State of a single word chain from `start_word` to `end_word`.
///
/// Moves are checked in two phases so the dictionary lookup can happen in
/// between without holding on to the state: [`LadderState::check_candidate`]
/// applies the local rules and [`LadderState::push_word`] appends a word the
/// caller has already validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderState {
    pub start_word: String,
    pub end_word: String,
    pub chain: Vec<WordItem>,
    pub difficulty: Difficulty,
    pub moves: usize,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub is_complete: bool,
}

impl LadderState {
    pub fn new(start_word: &str, end_word: &str, difficulty: Difficulty) -> Result<Self, SetupError> {
        let start_word = normalize(start_word);
        let end_word = normalize(end_word);

        if start_word.is_empty() || end_word.is_empty() {
            return Err(SetupError::EmptyWord);
        }
        if start_word.chars().count() != end_word.chars().count() {
            return Err(SetupError::LengthMismatch);
        }

        Ok(Self {
            chain: vec![WordItem::seed(start_word.clone())],
            start_word,
            end_word,
            difficulty,
            moves: 0,
            start_time: Some(Local::now()),
            end_time: None,
            is_complete: false,
        })
    }

    /// Mark every future rung with whether it moved towards the target.
    /// The start word counts as optimal.
    pub fn track_optimality(mut self) -> Self {
        if let Some(first) = self.chain.first_mut() {
            first.is_optimal_step = Some(true);
        }
        self
    }

    pub fn tracks_optimality(&self) -> bool {
        self.chain
            .first()
            .is_some_and(|item| item.is_optimal_step.is_some())
    }

    pub fn last_item(&self) -> &WordItem {
        // chain is seeded on construction and undo never pops the seed
        &self.chain[self.chain.len() - 1]
    }

    pub fn last_word(&self) -> &str {
        &self.last_item().word
    }

    pub fn status(&self) -> LadderStatus {
        if self.is_complete {
            LadderStatus::Complete
        } else {
            LadderStatus::InProgress
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.chain.iter().any(|item| item.word == word)
    }

    /// Apply the local move rules and return the normalized candidate.
    ///
    /// Checks run in order: completion, blank input, duplicate, one letter
    /// apart. A duplicate is reported even when it is also too far away.
    pub fn check_candidate(&self, candidate: &str) -> Result<String, MoveError> {
        if self.is_complete {
            return Err(MoveError::LadderComplete);
        }

        let word = normalize(candidate);
        if word.is_empty() {
            return Err(MoveError::EmptyInput);
        }
        if self.contains(&word) {
            return Err(MoveError::Duplicate(word));
        }
        if !are_one_letter_apart(self.last_word(), &word) {
            return Err(MoveError::NotOneLetterApart);
        }

        Ok(word)
    }

    /// Append a word that passed [`check_candidate`](Self::check_candidate)
    /// and the dictionary. Returns true when the word completes the ladder.
    pub fn push_word(&mut self, word: String) -> bool {
        let previous = self.last_item();
        let changed_letter_index = first_difference(&previous.word, &word);
        let is_optimal_step = previous.is_optimal_step.map(|previous_optimal| {
            let dist_previous = mismatch_count(&previous.word, &self.end_word);
            let dist_current = mismatch_count(&word, &self.end_word);
            dist_current < dist_previous || (dist_current == dist_previous && previous_optimal)
        });

        let completes = word == self.end_word;
        self.chain.push(WordItem {
            word,
            is_valid: true,
            changed_letter_index,
            is_optimal_step,
        });
        self.moves = self.chain.len() - 1;

        if completes {
            self.is_complete = true;
            self.end_time = Some(Local::now());
        }

        completes
    }

    /// Drop the last rung. Refused on a single-rung chain and once complete.
    pub fn undo(&mut self) -> bool {
        if self.chain.len() <= 1 || self.is_complete {
            return false;
        }

        self.chain.pop();
        self.moves = self.moves.saturating_sub(1);
        true
    }

    /// Restart the same puzzle from its start word.
    pub fn reset(&mut self) {
        let tracking = self.tracks_optimality();
        let mut seed = WordItem::seed(self.start_word.clone());
        if tracking {
            seed.is_optimal_step = Some(true);
        }

        self.chain = vec![seed];
        self.moves = 0;
        self.start_time = Some(Local::now());
        self.end_time = None;
        self.is_complete = false;
    }

    /// Minimum number of substitutions from start to end.
    pub fn optimal_moves(&self) -> usize {
        mismatch_count(&self.start_word, &self.end_word)
    }

    /// Completion percentage shown while playing, clamped to 100.
    pub fn progress(&self) -> u8 {
        if self.chain.len() <= 1 {
            return 0;
        }

        let steps = (self.chain.len() - 1) as f64;
        let budget = self.optimal_moves() as f64 * 1.5;
        if budget == 0.0 {
            return 100;
        }

        (steps / budget * 100.0).round().min(100.0) as u8
    }

    /// Whole seconds between the start stamp and the end stamp (or `now`).
    pub fn elapsed_secs(&self, now: DateTime<Local>) -> u64 {
        let Some(started) = self.start_time else {
            return 0;
        };
        let until = self.end_time.unwrap_or(now);
        until
            .signed_duration_since(started)
            .num_seconds()
            .try_into()
            .unwrap_or(0)
    }
}

pub fn normalize(word: &str) -> String {
    word.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cold_warm() -> LadderState {
        LadderState::new("cold", "warm", Difficulty::Medium).unwrap()
    }

    #[test]
    fn test_new_normalizes_and_seeds() {
        let ladder = cold_warm();

        assert_eq!(ladder.start_word, "COLD");
        assert_eq!(ladder.end_word, "WARM");
        assert_eq!(ladder.chain.len(), 1);
        assert_eq!(ladder.chain[0].word, "COLD");
        assert!(ladder.chain[0].is_valid);
        assert_eq!(ladder.chain[0].changed_letter_index, None);
        assert_eq!(ladder.moves, 0);
        assert!(ladder.start_time.is_some());
        assert!(ladder.end_time.is_none());
        assert_eq!(ladder.status(), LadderStatus::InProgress);
    }

    #[test]
    fn test_new_rejects_empty_before_length() {
        assert_matches!(
            LadderState::new("", "warm", Difficulty::Easy),
            Err(SetupError::EmptyWord)
        );
        assert_matches!(
            LadderState::new("  ", "", Difficulty::Easy),
            Err(SetupError::EmptyWord)
        );
        assert_matches!(
            LadderState::new("cat", "warm", Difficulty::Easy),
            Err(SetupError::LengthMismatch)
        );
    }

    #[test]
    fn test_check_candidate_order() {
        let mut ladder = cold_warm();
        ladder.push_word("CORD".into());

        assert_matches!(ladder.check_candidate("   "), Err(MoveError::EmptyInput));
        // duplicate wins even though COLD is also one letter from CORD
        assert_matches!(ladder.check_candidate("cold"), Err(MoveError::Duplicate(w)) if w == "COLD");
        assert_matches!(ladder.check_candidate("cord"), Err(MoveError::Duplicate(_)));
        assert_matches!(ladder.check_candidate("WARM"), Err(MoveError::NotOneLetterApart));
        assert_matches!(ladder.check_candidate("CORDS"), Err(MoveError::NotOneLetterApart));
        assert_eq!(ladder.check_candidate("card").unwrap(), "CARD");
    }

    #[test]
    fn test_push_word_tracks_moves_and_changed_index() {
        let mut ladder = cold_warm();

        assert!(!ladder.push_word("CORD".into()));
        assert_eq!(ladder.moves, 1);
        assert_eq!(ladder.chain[1].changed_letter_index, Some(2));
        assert_eq!(ladder.chain[1].is_optimal_step, None);

        assert!(!ladder.push_word("CARD".into()));
        assert_eq!(ladder.chain[2].changed_letter_index, Some(1));
        assert_eq!(ladder.moves, ladder.chain.len() - 1);
    }

    #[test]
    fn test_completion_stamps_end_time() {
        let mut ladder = cold_warm();
        for word in ["CORD", "CARD", "WARD"] {
            assert!(!ladder.push_word(word.into()));
        }
        assert!(ladder.push_word("WARM".into()));

        assert!(ladder.is_complete);
        assert!(ladder.end_time.is_some());
        assert_eq!(ladder.moves, 4);
        assert_eq!(ladder.status(), LadderStatus::Complete);
        assert_matches!(ladder.check_candidate("WARP"), Err(MoveError::LadderComplete));
    }

    #[test]
    fn test_undo() {
        let mut ladder = cold_warm();
        assert!(!ladder.undo());
        assert_eq!(ladder.moves, 0);
        assert_eq!(ladder.chain.len(), 1);

        ladder.push_word("CORD".into());
        assert!(ladder.undo());
        assert_eq!(ladder.moves, 0);
        assert_eq!(ladder.last_word(), "COLD");
    }

    #[test]
    fn test_undo_refused_after_completion() {
        let mut ladder = LadderState::new("cat", "cot", Difficulty::Easy).unwrap();
        assert!(ladder.push_word("COT".into()));
        assert!(!ladder.undo());
        assert!(ladder.is_complete);
    }

    #[test]
    fn test_reset_keeps_puzzle() {
        let mut ladder = cold_warm().track_optimality();
        ladder.push_word("CORD".into());
        ladder.push_word("CARD".into());

        ladder.reset();

        assert_eq!(ladder.chain.len(), 1);
        assert_eq!(ladder.moves, 0);
        assert_eq!(ladder.start_word, "COLD");
        assert_eq!(ladder.end_word, "WARM");
        assert_eq!(ladder.difficulty, Difficulty::Medium);
        assert!(ladder.tracks_optimality());
        assert!(!ladder.is_complete);
    }

    #[test]
    fn test_progress() {
        let mut ladder = cold_warm();
        assert_eq!(ladder.progress(), 0);

        // optimal moves = 4, budget = 6
        ladder.push_word("CORD".into());
        assert_eq!(ladder.progress(), 17);
        ladder.push_word("CARD".into());
        assert_eq!(ladder.progress(), 33);
        ladder.push_word("WARD".into());
        assert_eq!(ladder.progress(), 50);
    }

    #[test]
    fn test_progress_clamps_at_100() {
        let mut ladder = LadderState::new("cat", "cot", Difficulty::Easy).unwrap();
        // budget 1.5 moves
        ladder.push_word("BAT".into());
        ladder.push_word("BOT".into());
        assert_eq!(ladder.progress(), 100);
    }

    #[test]
    fn test_optimality_marks() {
        let mut ladder = cold_warm().track_optimality();
        assert_eq!(ladder.chain[0].is_optimal_step, Some(true));

        // COLD (4) -> CORD (3): closer
        ladder.push_word("CORD".into());
        assert_eq!(ladder.chain[1].is_optimal_step, Some(true));
        // CORD (3) -> CARD (2): closer
        ladder.push_word("CARD".into());
        assert_eq!(ladder.chain[2].is_optimal_step, Some(true));
        // CARD (2) -> CART (2): tie after an optimal step
        ladder.push_word("CART".into());
        assert_eq!(ladder.chain[3].is_optimal_step, Some(true));
        // CART (2) -> CURT (3): further away
        ladder.push_word("CURT".into());
        assert_eq!(ladder.chain[4].is_optimal_step, Some(false));
        // CURT (3) -> HURT (3): tie after a non-optimal step
        ladder.push_word("HURT".into());
        assert_eq!(ladder.chain[5].is_optimal_step, Some(false));
    }

    #[test]
    fn test_difficulty_lengths() {
        assert_eq!(Difficulty::Easy.word_length(), 3);
        assert_eq!(Difficulty::Medium.word_length(), 4);
        assert_eq!(Difficulty::Hard.word_length(), 5);
        assert_eq!(Difficulty::for_length(4), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.to_string(), "hard");
    }

    #[test]
    fn test_serde_roundtrip_snapshot() {
        let mut ladder = cold_warm();
        ladder.push_word("CORD".into());
        let json = serde_json::to_string(&ladder).unwrap();
        let restored: LadderState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ladder);
    }
}
