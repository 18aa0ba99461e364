use crate::{loan::Loan, types::{LoanId, Money}};
use serde::{Deserialize, Serialize};

/// Everything a player (or host) can ask the engine to do.
/// Each variant is consumed by `engine::transition`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GameAction {
    /// Play one month.
    AdvanceTurn,

    /// Put spare cash against one loan's principal.
    ApplyExtraPayment { loan_id: LoanId, amount: Money },

    /// Take on a new loan; its principal is paid out as cash.
    TakeLoan { loan: Loan },

    /// A one-off spending choice that trades cash for wellbeing.
    MakeDecision {
        cost:             Money,
        happiness_change: i32,
        stress_change:    i32,
    },

    /// Throw the current game away and start over.
    Reset,
}

impl GameAction {
    /// Stable short name, used in logs and rejection events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AdvanceTurn             => "advance_turn",
            Self::ApplyExtraPayment { .. } => "apply_extra_payment",
            Self::TakeLoan { .. }         => "take_loan",
            Self::MakeDecision { .. }     => "make_decision",
            Self::Reset                   => "reset",
        }
    }
}
