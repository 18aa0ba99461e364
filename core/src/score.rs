//! Final score and leaderboard records.

use crate::{
    error::{SimError, SimResult},
    metrics::FinancialMetrics,
    state::GameState,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PLAYER_NAME_LEN: usize = 32;
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// floor(cash × 0.5 + savings + happiness × 100 − total debt × 1.5)
pub fn final_score(metrics: &FinancialMetrics) -> i64 {
    (metrics.cash * 0.5 + metrics.savings + f64::from(metrics.happiness) * 100.0
        - metrics.total_debt * 1.5)
        .floor() as i64
}

/// A score ready to be stored. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub player_name:     String,
    pub final_net_worth: i64,
    pub months_survived: i64,
    pub debt_free:       bool,
    pub score:           i64,
    pub achieved_at:     String,
}

impl ScoreSubmission {
    /// Build a submission from a finished game.
    pub fn from_final_state(
        player_name: &str,
        state: &GameState,
        start_year: i32,
        achieved_at: DateTime<Utc>,
    ) -> SimResult<Self> {
        if !state.is_game_over {
            return Err(SimError::InvalidScore {
                reason: "game is still in progress".to_string(),
            });
        }
        let player_name = validate_player_name(player_name)?;
        let metrics = &state.metrics;
        Ok(Self {
            player_name,
            final_net_worth: metrics.net_worth().round() as i64,
            months_survived: i64::from(state.elapsed_months(start_year)),
            debt_free:       metrics.total_debt <= 0.0,
            score:           final_score(metrics),
            achieved_at:     achieved_at.to_rfc3339(),
        })
    }
}

/// A stored leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id:              i64,
    pub player_name:     String,
    pub final_net_worth: i64,
    pub months_survived: i64,
    pub debt_free:       bool,
    pub score:           i64,
    pub achieved_at:     String,
}

fn validate_player_name(raw: &str) -> SimResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SimError::InvalidScore {
            reason: "player name must not be empty".to_string(),
        });
    }
    if name.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(SimError::InvalidScore {
            reason: format!("player name longer than {MAX_PLAYER_NAME_LEN} characters"),
        });
    }
    Ok(name.to_string())
}
