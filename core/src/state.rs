//! The aggregate game state. Owned by the engine; replaced wholesale on
//! every transition.

use crate::{
    clock,
    config::GameConfig,
    loan::{self, Loan},
    metrics::FinancialMetrics,
    terminal::GameOutcome,
    types::{Money, MonthIndex},
};
use serde::{Deserialize, Serialize};

/// One row of the month-by-month record. Written once per turn, read only
/// by displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub month:     MonthIndex,
    pub cash:      Money,
    pub net_worth: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub metrics:          FinancialMetrics,
    /// Insertion order is preserved; ids are unique.
    pub loans:            Vec<Loan>,
    pub is_game_over:     bool,
    pub game_won:         bool,
    /// Present exactly when `is_game_over`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<String>,
    pub history:          Vec<HistoryPoint>,
}

impl GameState {
    /// A fresh, active game from the configured starting position.
    pub fn new_game(config: &GameConfig) -> Self {
        let loans = config.starting_loans.clone();
        let metrics = FinancialMetrics {
            total_debt: loan::total_principal(&loans),
            ..config.starting_metrics.clone()
        };
        Self {
            metrics,
            loans,
            is_game_over:     false,
            game_won:         false,
            game_over_reason: None,
            history:          Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.is_game_over
    }

    pub fn loan(&self, loan_id: &str) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == loan_id)
    }

    pub fn elapsed_months(&self, start_year: i32) -> MonthIndex {
        clock::elapsed_months(self.metrics.month, self.metrics.year, start_year)
    }

    pub(crate) fn finish(&mut self, outcome: GameOutcome) {
        self.is_game_over = true;
        self.game_won = outcome.is_win();
        self.game_over_reason = Some(outcome.reason().to_string());
    }
}
