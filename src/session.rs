use crate::ladder::LadderState;

/// Lifecycle of a time attack session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Over,
}

/// Read-only view of a time attack session
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAttackSession {
    pub score: u32,
    /// Seconds left on the clock.
    pub remaining_time: u32,
    pub is_active: bool,
    pub is_over: bool,
    pub current_ladder: Option<LadderState>,
}

impl TimeAttackSession {
    pub fn phase(&self) -> SessionPhase {
        match (self.is_active, self.is_over) {
            (true, _) => SessionPhase::Active,
            (false, true) => SessionPhase::Over,
            (false, false) => SessionPhase::Idle,
        }
    }
}
