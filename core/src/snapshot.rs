//! Session snapshot: the saved-game format.
//!
//! The engine never persists itself. Hosts save a `SessionSnapshot` and,
//! on load, must pass the state through `validate` before handing it
//! back to the engine.

use crate::{
    config::RuleConfig,
    error::{SimError, SimResult},
    loan,
    state::GameState,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Totals are compared to this tolerance to absorb float summation order.
const DEBT_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub format_version: u32,
    pub saved_at:       String,
    pub state:          GameState,
}

impl SessionSnapshot {
    pub fn new(state: GameState, saved_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            format_version: SNAPSHOT_FORMAT_VERSION,
            saved_at:       saved_at.to_rfc3339(),
            state,
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and validate a saved snapshot.
    pub fn from_json(json: &str, rules: &RuleConfig) -> SimResult<Self> {
        let snapshot: Self = serde_json::from_str(json)?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                snapshot.format_version
            )));
        }
        validate(&snapshot.state, rules)?;
        Ok(snapshot)
    }
}

/// Check every invariant the engine relies on.
pub fn validate(state: &GameState, rules: &RuleConfig) -> SimResult<()> {
    let m = &state.metrics;

    if !m.indicators_in_range() {
        return Err(corrupt(format!(
            "indicator out of range (happiness={}, stress={}, credit_score={})",
            m.happiness, m.stress, m.credit_score
        )));
    }
    if !(1..=12).contains(&m.month) {
        return Err(corrupt(format!("month {} outside 1..=12", m.month)));
    }
    if m.year < rules.start_year {
        return Err(corrupt(format!("year {} before start year {}", m.year, rules.start_year)));
    }
    let money = [m.cash, m.monthly_income, m.monthly_expenses, m.total_debt, m.savings];
    if money.iter().any(|v| !v.is_finite()) {
        return Err(corrupt("non-finite money value".to_string()));
    }

    let mut seen = HashSet::new();
    for l in &state.loans {
        if !seen.insert(l.id.as_str()) {
            return Err(corrupt(format!("duplicate loan id '{}'", l.id)));
        }
        if !(l.principal > 0.0) {
            return Err(corrupt(format!("loan '{}' has non-positive principal", l.id)));
        }
    }

    let expected_debt = loan::total_principal(&state.loans);
    if (m.total_debt - expected_debt).abs() > DEBT_TOLERANCE {
        return Err(corrupt(format!(
            "total_debt {} does not match loan principals {}",
            m.total_debt, expected_debt
        )));
    }

    if state.is_game_over != state.game_over_reason.is_some() {
        return Err(corrupt("game_over_reason must be present exactly when the game is over".to_string()));
    }
    if state.game_won && !state.is_game_over {
        return Err(corrupt("game marked won while still in progress".to_string()));
    }
    Ok(())
}

fn corrupt(reason: String) -> SimError {
    SimError::CorruptSession { reason }
}
