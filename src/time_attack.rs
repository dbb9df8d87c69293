//! Time attack: solve as many ladders as possible before the clock runs out.
//!
//! The session moves `Idle -> Active -> Over`. The countdown, manual stops
//! and puzzle generation failures all race to end an active session; the
//! first one to take the `Active -> Over` transition under the state lock
//! commits the stats, the others see the session already over and do
//! nothing. Each session gets a fresh id so ladders and dictionary answers
//! that arrive for an older session are dropped.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::config::{Config, SettingsPatch, ValidationPolicy};
use crate::dictionary::DictionaryPort;
use crate::engine::{judge, Accepted, InFlight};
use crate::error::{MoveError, PuzzleError, SessionError};
use crate::ladder::{Difficulty, LadderState};
use crate::puzzle::PuzzleGenerator;
use crate::session::{SessionPhase, TimeAttackSession};
use crate::stats::TimeAttackStats;
use crate::store::{load_json, save_json, PersistencePort, StoreKey};

#[derive(Debug, Default)]
struct TimedState {
    phase: SessionPhase,
    session_id: u64,
    score: u32,
    remaining: u32,
    ladder: Option<LadderState>,
    /// Used by the next session.
    difficulty: Difficulty,
    /// Fixed for the running session.
    session_difficulty: Difficulty,
    stats: TimeAttackStats,
    error: Option<MoveError>,
}

impl TimedState {
    fn reject<T>(&mut self, error: MoveError) -> Result<T, MoveError> {
        if !error.is_rule_violation() {
            debug!("Move not applied: {error}");
        }
        self.error = Some(error.clone());
        Err(error)
    }

    fn is_current(&self, session_id: u64) -> bool {
        self.phase == SessionPhase::Active && self.session_id == session_id
    }
}

pub struct TimeAttackEngine {
    dictionary: Arc<dyn DictionaryPort>,
    store: Arc<dyn PersistencePort>,
    puzzles: PuzzleGenerator,
    policy: ValidationPolicy,
    duration_secs: u32,
    in_flight: AtomicBool,
    state: Mutex<TimedState>,
}

impl TimeAttackEngine {
    pub fn new(
        dictionary: Arc<dyn DictionaryPort>,
        store: Arc<dyn PersistencePort>,
        config: &Config,
    ) -> Self {
        let stats = load_json(store.as_ref(), StoreKey::TimeAttackStats).unwrap_or_default();

        Self {
            puzzles: PuzzleGenerator::new(dictionary.clone()),
            dictionary,
            store,
            policy: config.validation_policy,
            duration_secs: config.time_attack_secs,
            in_flight: AtomicBool::new(false),
            state: Mutex::new(TimedState {
                remaining: config.time_attack_secs,
                difficulty: config.difficulty,
                stats,
                ..TimedState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the `Active -> Over` transition and commit stats. False if the
    /// session was not active.
    fn finish(&self, state: &mut TimedState, reason: &str) -> bool {
        if state.phase != SessionPhase::Active {
            return false;
        }

        state.phase = SessionPhase::Over;
        state.stats.record_session(state.score);
        info!(
            score = state.score,
            remaining = state.remaining,
            reason,
            "Time attack session over"
        );
        save_json(self.store.as_ref(), StoreKey::TimeAttackStats, &state.stats);
        true
    }

    /// Start a new session and load its first ladder.
    ///
    /// If the first ladder cannot be generated the session ends at once and
    /// the generation error is returned.
    pub async fn start_session(&self) -> Result<(), SessionError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Err(SessionError::Busy);
        };

        let (session_id, difficulty) = {
            let mut state = self.lock();
            if state.phase == SessionPhase::Active {
                return Err(SessionError::AlreadyActive);
            }
            state.phase = SessionPhase::Active;
            state.session_id += 1;
            state.score = 0;
            state.remaining = self.duration_secs;
            state.ladder = None;
            state.error = None;
            state.session_difficulty = state.difficulty;
            (state.session_id, state.session_difficulty)
        };
        info!(
            session_id,
            %difficulty,
            secs = self.duration_secs,
            "Time attack session started"
        );

        self.load_next_ladder(session_id, difficulty).await?;
        Ok(())
    }

    async fn load_next_ladder(
        &self,
        session_id: u64,
        difficulty: Difficulty,
    ) -> Result<(), PuzzleError> {
        let generated = self.puzzles.generate(difficulty).await.and_then(|puzzle| {
            LadderState::new(&puzzle.start_word, &puzzle.end_word, puzzle.difficulty)
                .map_err(PuzzleError::from)
        });

        let mut state = self.lock();
        if !state.is_current(session_id) {
            debug!(session_id, "Discarding ladder for a finished session");
            return Ok(());
        }

        match generated {
            Ok(ladder) => {
                debug!(start = %ladder.start_word, end = %ladder.end_word, "Loaded next ladder");
                state.ladder = Some(ladder.track_optimality());
                Ok(())
            }
            Err(e) => {
                warn!(session_id, "Failed to generate next ladder: {e}");
                self.finish(&mut state, "puzzle generation failed");
                Err(e)
            }
        }
    }

    /// Advance the clock by one second. Returns whether the session is still
    /// running afterwards.
    pub fn tick(&self) -> bool {
        let mut state = self.lock();
        if state.phase != SessionPhase::Active {
            return false;
        }

        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            self.finish(&mut state, "time expired");
            return false;
        }
        true
    }

    /// Stop the session early. Only the call that actually ends the session
    /// returns true.
    pub fn end_session(&self) -> bool {
        let mut state = self.lock();
        self.finish(&mut state, "stopped")
    }

    /// Validate `candidate` against the current ladder. Completing the ladder
    /// scores a point and loads the next one before returning.
    pub async fn submit_word(&self, candidate: &str) -> Result<Accepted, MoveError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            return Err(MoveError::Busy);
        };

        let (word, session_id) = {
            let mut state = self.lock();
            if state.phase != SessionPhase::Active {
                return state.reject(MoveError::SessionInactive);
            }
            let checked = match &state.ladder {
                Some(ladder) => ladder.check_candidate(candidate),
                None => Err(MoveError::NotStarted),
            };
            match checked {
                Ok(word) => (word, state.session_id),
                Err(e) => return state.reject(e),
            }
        };

        let verdict = self.dictionary.is_valid_word(&word).await;

        let (accepted, difficulty) = {
            let mut guard = self.lock();
            let state = &mut *guard;
            if !state.is_current(session_id) {
                debug!(word = %word, "Discarding validation for a finished session");
                return state.reject(MoveError::SessionInactive);
            }
            if let Err(e) = judge(verdict, &word, self.policy) {
                return state.reject(e);
            }
            let Some(ladder) = state.ladder.as_mut() else {
                return state.reject(MoveError::NotStarted);
            };

            let completed = ladder.push_word(word);
            let item = ladder.last_item().clone();
            debug!(word = %item.word, optimal = ?item.is_optimal_step, "Accepted word");
            if completed {
                state.score += 1;
                info!(score = state.score, remaining = state.remaining, "Ladder solved");
            }
            state.error = None;
            (Accepted { item, completed }, state.session_difficulty)
        };

        if accepted.completed {
            // a failure here has already ended the session
            let _ = self.load_next_ladder(session_id, difficulty).await;
        }
        Ok(accepted)
    }

    /// Difficulty changes apply from the next session.
    pub fn apply_settings(&self, patch: &SettingsPatch) {
        if let Some(difficulty) = patch.difficulty {
            self.lock().difficulty = difficulty;
        }
    }

    pub fn snapshot(&self) -> TimeAttackSession {
        let state = self.lock();
        TimeAttackSession {
            score: state.score,
            remaining_time: state.remaining,
            is_active: state.phase == SessionPhase::Active,
            is_over: state.phase == SessionPhase::Over,
            current_ladder: state.ladder.clone(),
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.lock().phase
    }

    pub fn is_active(&self) -> bool {
        self.phase() == SessionPhase::Active
    }

    pub fn stats(&self) -> TimeAttackStats {
        self.lock().stats.clone()
    }

    pub fn last_error(&self) -> Option<MoveError> {
        self.lock().error.clone()
    }
}
