//! Classic mode: one ladder at a time, played at the player's pace.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::{Config, SettingsPatch, ValidationPolicy};
use crate::dictionary::{DictionaryError, DictionaryPort};
use crate::error::{MoveError, PuzzleError, SetupError};
use crate::ladder::{Difficulty, LadderState, LadderStatus, WordItem};
use crate::puzzle::{rank_hints, target_hints, Puzzle, PuzzleGenerator, NEIGHBOR_LOOKUP_LIMIT};
use crate::stats::SessionStats;
use crate::store::{load_json, remove_key, save_json, PersistencePort, StoreKey};

/// Marks an operation that awaits the dictionary. Released on drop, so a
/// cancelled future frees the engine too.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A word the engine added to the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub item: WordItem,
    /// The word was the target.
    pub completed: bool,
}

/// Apply the validation policy to a dictionary answer.
pub(crate) fn judge(
    verdict: Result<bool, DictionaryError>,
    word: &str,
    policy: ValidationPolicy,
) -> Result<(), MoveError> {
    match verdict {
        Ok(true) => Ok(()),
        Ok(false) => Err(MoveError::InvalidWord(word.to_string())),
        Err(e) => match policy {
            ValidationPolicy::FailClosed => Err(MoveError::ValidationUnavailable(e.to_string())),
            ValidationPolicy::FailOpen => {
                warn!(word = %word, "Accepting word without dictionary check: {e}");
                Ok(())
            }
        },
    }
}

#[derive(Debug, Default)]
struct ClassicState {
    ladder: Option<LadderState>,
    /// Bumped whenever the chain changes outside `submit_word`.
    epoch: u64,
    stats: SessionStats,
    error: Option<MoveError>,
    hints: bool,
    restored: bool,
}

impl ClassicState {
    fn reject<T>(&mut self, error: MoveError) -> Result<T, MoveError> {
        if !error.is_rule_violation() {
            debug!("Move not applied: {error}");
        }
        self.error = Some(error.clone());
        Err(error)
    }
}

pub struct LadderEngine {
    dictionary: Arc<dyn DictionaryPort>,
    store: Arc<dyn PersistencePort>,
    puzzles: PuzzleGenerator,
    policy: ValidationPolicy,
    hint_limit: usize,
    in_flight: AtomicBool,
    state: Mutex<ClassicState>,
}

impl LadderEngine {
    /// Build the engine and restore any saved game and stats.
    pub fn new(
        dictionary: Arc<dyn DictionaryPort>,
        store: Arc<dyn PersistencePort>,
        config: &Config,
    ) -> Self {
        let ladder = load_json::<LadderState>(store.as_ref(), StoreKey::ClassicGame)
            .filter(|ladder| {
                let usable = ladder.chain.first().is_some_and(|first| first.word == ladder.start_word);
                if !usable {
                    warn!("Discarding saved game with a broken chain");
                }
                usable
            });
        let stats = load_json(store.as_ref(), StoreKey::ClassicStats).unwrap_or_default();

        Self {
            puzzles: PuzzleGenerator::new(dictionary.clone()),
            dictionary,
            store,
            policy: config.validation_policy,
            hint_limit: config.hint_limit,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(ClassicState {
                restored: ladder.is_some(),
                ladder,
                stats,
                hints: config.hints,
                ..ClassicState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ClassicState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_game(&self, state: &ClassicState) {
        match &state.ladder {
            Some(ladder) => save_json(self.store.as_ref(), StoreKey::ClassicGame, ladder),
            None => remove_key(self.store.as_ref(), StoreKey::ClassicGame),
        }
    }

    pub fn start(
        &self,
        start_word: &str,
        end_word: &str,
        difficulty: Difficulty,
    ) -> Result<(), SetupError> {
        let ladder = LadderState::new(start_word, end_word, difficulty)?;
        info!(
            start = %ladder.start_word,
            end = %ladder.end_word,
            %difficulty,
            "Starting ladder"
        );

        let mut state = self.lock();
        state.ladder = Some(ladder);
        state.epoch += 1;
        state.error = None;
        state.restored = false;
        self.persist_game(&state);
        Ok(())
    }

    /// Start a ladder between two random words of the given difficulty.
    pub async fn start_random(&self, difficulty: Difficulty) -> Result<Puzzle, PuzzleError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Err(PuzzleError::Busy);
        };

        let puzzle = self.puzzles.generate(difficulty).await.inspect_err(|e| {
            warn!(%difficulty, "Failed to generate puzzle: {e}");
        })?;
        self.start(&puzzle.start_word, &puzzle.end_word, puzzle.difficulty)?;
        Ok(puzzle)
    }

    /// Validate `candidate` and add it to the ladder.
    ///
    /// Rule violations are checked locally before the dictionary is asked.
    /// The dictionary answer is dropped if the ladder was reset, undone or
    /// replaced while it was pending.
    pub async fn submit_word(&self, candidate: &str) -> Result<Accepted, MoveError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Err(MoveError::Busy);
        };

        let (word, epoch) = {
            let mut state = self.lock();
            let checked = match &state.ladder {
                Some(ladder) => ladder.check_candidate(candidate),
                None => Err(MoveError::NotStarted),
            };
            match checked {
                Ok(word) => (word, state.epoch),
                Err(e) => return state.reject(e),
            }
        };

        let verdict = self.dictionary.is_valid_word(&word).await;

        let mut guard = self.lock();
        let state = &mut *guard;
        if state.epoch != epoch {
            debug!(word = %word, "Discarding validation for a ladder that changed");
            return state.reject(MoveError::Superseded);
        }
        if let Err(e) = judge(verdict, &word, self.policy) {
            return state.reject(e);
        }
        let Some(ladder) = state.ladder.as_mut() else {
            return state.reject(MoveError::NotStarted);
        };

        let completed = ladder.push_word(word);
        let item = ladder.last_item().clone();
        debug!(word = %item.word, moves = ladder.moves, "Accepted word");

        if completed {
            let elapsed = ladder.elapsed_secs(Local::now());
            state.stats.record_win(ladder.moves, elapsed);
            info!(moves = ladder.moves, elapsed, "Ladder solved");
            save_json(self.store.as_ref(), StoreKey::ClassicStats, &state.stats);
        }

        state.error = None;
        self.persist_game(state);
        Ok(Accepted { item, completed })
    }

    /// Remove the last word. False on a single-word or finished ladder.
    pub fn undo(&self) -> bool {
        let mut state = self.lock();
        let undone = state.ladder.as_mut().is_some_and(LadderState::undo);
        if undone {
            state.epoch += 1;
            state.error = None;
            self.persist_game(&state);
        }
        undone
    }

    /// Replay the current puzzle from its start word.
    pub fn reset(&self) -> bool {
        let mut state = self.lock();
        let Some(ladder) = state.ladder.as_mut() else {
            return false;
        };
        ladder.reset();
        state.epoch += 1;
        state.error = None;
        self.persist_game(&state);
        true
    }

    /// Drop the current ladder and its saved copy.
    pub fn abandon(&self) {
        let mut state = self.lock();
        state.ladder = None;
        state.epoch += 1;
        state.error = None;
        state.restored = false;
        self.persist_game(&state);
    }

    /// Suggested next words, closest to the target first.
    ///
    /// Falls back to unchecked target-letter substitutions when the
    /// dictionary cannot be reached.
    pub async fn hints(&self) -> Vec<String> {
        let (last, target, used) = {
            let state = self.lock();
            let Some(ladder) = state.ladder.as_ref().filter(|l| state.hints && !l.is_complete)
            else {
                return Vec::new();
            };
            let used: Vec<String> = ladder.chain.iter().map(|item| item.word.clone()).collect();
            (ladder.last_word().to_string(), ladder.end_word.clone(), used)
        };
        let used: Vec<&str> = used.iter().map(String::as_str).collect();

        match self
            .dictionary
            .neighbor_words(&last, NEIGHBOR_LOOKUP_LIMIT)
            .await
        {
            Ok(neighbors) => rank_hints(neighbors, &used, &target, self.hint_limit),
            Err(e) => {
                warn!("Hint lookup failed, using target letters: {e}");
                target_hints(&last, &target, self.hint_limit + used.len())
                    .into_iter()
                    .filter(|hint| !used.contains(&hint.as_str()))
                    .take(self.hint_limit)
                    .collect()
            }
        }
    }

    pub fn apply_settings(&self, patch: &SettingsPatch) {
        if let Some(hints) = patch.hints {
            self.lock().hints = hints;
        }
    }

    pub fn status(&self) -> LadderStatus {
        self.lock()
            .ladder
            .as_ref()
            .map_or(LadderStatus::NotStarted, LadderState::status)
    }

    pub fn snapshot(&self) -> Option<LadderState> {
        self.lock().ladder.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.lock().stats.clone()
    }

    pub fn progress(&self) -> u8 {
        self.lock().ladder.as_ref().map_or(0, LadderState::progress)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.lock()
            .ladder
            .as_ref()
            .map_or(0, |ladder| ladder.elapsed_secs(Local::now()))
    }

    pub fn last_error(&self) -> Option<MoveError> {
        self.lock().error.clone()
    }

    /// An unfinished game was restored from the store.
    pub fn has_saved_game(&self) -> bool {
        let state = self.lock();
        state.restored && state.ladder.as_ref().is_some_and(|l| !l.is_complete)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}
