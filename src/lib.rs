// Library surface for the terminal binary, headless integration tests and reuse.
pub mod app_dirs;
pub mod config;
pub mod dictionary;
pub mod distance;
pub mod engine;
pub mod error;
pub mod ladder;
pub mod puzzle;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod time_attack;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{Config, SettingsPatch, ValidationPolicy};
pub use dictionary::{DictionaryError, DictionaryPort, TimeoutDictionary, WordListDictionary};
pub use engine::{Accepted, LadderEngine};
pub use error::{MoveError, PuzzleError, SessionError, SetupError, StoreError};
pub use ladder::{Difficulty, LadderState, LadderStatus, WordItem};
pub use session::{SessionPhase, TimeAttackSession};
pub use stats::{SessionStats, TimeAttackStats};
pub use store::{MemoryStore, PersistencePort, SqliteStore, StoreKey};
pub use time_attack::TimeAttackEngine;
