//! End-of-game checks, evaluated after every turn.
//!
//! PRECEDENCE (first match wins):
//!   1. Bankruptcy
//!   2. Burnout
//!   3. Financial freedom (the only win)
//!   4. Time expired

use crate::{clock, config::RuleConfig, loan::Loan, metrics::FinancialMetrics};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOutcome {
    Bankruptcy,
    Burnout,
    FinancialFreedom,
    TimeExpired,
}

impl GameOutcome {
    pub fn is_win(self) -> bool {
        matches!(self, Self::FinancialFreedom)
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Bankruptcy       => "Bankruptcy: You ran out of money.",
            Self::Burnout          => "Burnout: Stress levels became unmanageable.",
            Self::FinancialFreedom => "Financial Freedom Achieved!",
            Self::TimeExpired      => "Time's Up: You didn't reach financial freedom in time.",
        }
    }
}

/// Decide whether the game ends on these post-turn metrics and loans.
/// `None` means play continues.
pub fn evaluate(metrics: &FinancialMetrics, loans: &[Loan], rules: &RuleConfig) -> Option<GameOutcome> {
    let debt_free = metrics.total_debt <= 0.0 && loans.is_empty();
    let elapsed = clock::elapsed_months(metrics.month, metrics.year, rules.start_year);

    if metrics.cash < rules.bankruptcy_floor {
        Some(GameOutcome::Bankruptcy)
    } else if metrics.stress >= rules.burnout_stress {
        Some(GameOutcome::Burnout)
    } else if debt_free && metrics.cash > 0.0 && metrics.savings > rules.victory_savings {
        Some(GameOutcome::FinancialFreedom)
    } else if elapsed > rules.max_months {
        Some(GameOutcome::TimeExpired)
    } else {
        None
    }
}
