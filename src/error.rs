//! Error taxonomy for ladder setup, moves, puzzle generation, timed sessions
//! and persistence.
//!
//! All of these are recoverable and returned to the immediate caller. The
//! `Display` text of the setup and move errors is the message shown to the
//! player.

use thiserror::Error;

use crate::dictionary::DictionaryError;
use crate::ladder::Difficulty;

/// Rejected `start` arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("Both start and end words are required")]
    EmptyWord,
    #[error("Start and end words must be the same length")]
    LengthMismatch,
}

/// Reasons a submitted word is not added to the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("Please enter a word")]
    EmptyInput,
    #[error("Word already used in this ladder")]
    Duplicate(String),
    #[error("You can only change one letter at a time")]
    NotOneLetterApart,
    #[error("\"{0}\" is not a valid word")]
    InvalidWord(String),
    #[error("Could not check the word right now ({0}). Please try again.")]
    ValidationUnavailable(String),
    #[error("No ladder is in progress")]
    NotStarted,
    #[error("This ladder is already complete")]
    LadderComplete,
    #[error("Still checking the previous word")]
    Busy,
    #[error("The time attack session is not running")]
    SessionInactive,
    #[error("The ladder changed while the word was being checked")]
    Superseded,
}

impl MoveError {
    /// Rule violations, as opposed to engine state or dictionary problems.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput | Self::Duplicate(_) | Self::NotOneLetterApart | Self::InvalidWord(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("No {difficulty} word of length {length} is available")]
    NoWord { difficulty: Difficulty, length: usize },
    #[error("Could not find two different {difficulty} words after {attempts} attempts")]
    NoDistinctPair {
        difficulty: Difficulty,
        attempts: usize,
    },
    #[error("Failed to generate puzzle: {0}")]
    Unavailable(#[from] DictionaryError),
    #[error("A puzzle is already being generated")]
    Busy,
    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Failures of `TimeAttackEngine::start_session`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("A time attack session is already running")]
    AlreadyActive,
    #[error("Another time attack operation is in progress")]
    Busy,
    #[error("Failed to generate next ladder: {0}")]
    Puzzle(#[from] PuzzleError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
