use serde::{Deserialize, Serialize};

use crate::util::running_mean;

/// Classic mode totals. Only won ladders are recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub games_played: u32,
    pub games_won: u32,
    /// Fastest win in seconds, 0 while unset.
    pub best_time: u64,
    pub average_steps: f64,
    pub longest_chain: usize,
}

impl SessionStats {
    pub fn record_win(&mut self, moves: usize, elapsed_secs: u64) {
        let won_before = self.games_won;

        self.games_played += 1;
        self.games_won += 1;
        self.best_time = if self.best_time == 0 {
            elapsed_secs
        } else {
            self.best_time.min(elapsed_secs)
        };
        self.average_steps = running_mean(self.average_steps, won_before, moves as f64).round();
        self.longest_chain = self.longest_chain.max(moves + 1);
    }

    pub fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            (self.games_won as f64 / self.games_played as f64 * 100.0).round()
        }
    }
}

/// Time attack totals, updated once per finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAttackStats {
    pub sessions_played: u32,
    pub highest_score: u32,
    pub total_words_solved: u32,
}

impl TimeAttackStats {
    pub fn record_session(&mut self, score: u32) {
        self.sessions_played += 1;
        self.highest_score = self.highest_score.max(score);
        self.total_words_solved += score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_win() {
        let mut stats = SessionStats::default();
        stats.record_win(4, 42);

        assert_eq!(stats.games_played, 1);
        assert_eq!(stats.games_won, 1);
        assert_eq!(stats.best_time, 42);
        assert_eq!(stats.average_steps, 4.0);
        assert_eq!(stats.longest_chain, 5);
    }

    #[test]
    fn test_best_time_keeps_minimum() {
        let mut stats = SessionStats::default();
        stats.record_win(4, 42);
        stats.record_win(6, 90);
        assert_eq!(stats.best_time, 42);
        stats.record_win(3, 15);
        assert_eq!(stats.best_time, 15);
    }

    #[test]
    fn test_zero_second_win_stays_unset_marker() {
        let mut stats = SessionStats::default();
        stats.record_win(1, 0);
        assert_eq!(stats.best_time, 0);
        stats.record_win(2, 30);
        assert_eq!(stats.best_time, 30);
    }

    #[test]
    fn test_average_steps_is_rounded_running_mean() {
        let mut stats = SessionStats::default();
        stats.record_win(4, 10);
        stats.record_win(7, 10);
        // (4 + 7) / 2 = 5.5
        assert_eq!(stats.average_steps, 6.0);
        stats.record_win(3, 10);
        // (6 * 2 + 3) / 3 = 5
        assert_eq!(stats.average_steps, 5.0);
        assert_eq!(stats.longest_chain, 8);
    }

    #[test]
    fn test_win_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.win_rate(), 0.0);
        stats.record_win(3, 5);
        assert_eq!(stats.win_rate(), 100.0);
    }

    #[test]
    fn test_time_attack_session() {
        let mut stats = TimeAttackStats::default();
        stats.record_session(3);
        stats.record_session(1);

        assert_eq!(stats.sessions_played, 2);
        assert_eq!(stats.highest_score, 3);
        assert_eq!(stats.total_words_solved, 4);
    }
}
