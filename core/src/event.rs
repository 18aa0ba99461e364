//! Notifications produced by transitions.
//!
//! RULE: Events describe what happened; they never feed back into the
//! engine. Hosts show them to the player and may persist them to the
//! event log.

use crate::{
    terminal::GameOutcome,
    types::{LoanId, Money, MonthIndex, RunId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Turn events ────────────────────────────────
    TurnAdvanced {
        month:     MonthIndex,
        cash:      Money,
        net_worth: Money,
    },
    LifeEventFired {
        month:       MonthIndex,
        title:       String,
        description: String,
        negative:    bool,
    },
    LoanPaidOff {
        month:   MonthIndex,
        loan_id: LoanId,
        name:    String,
    },
    GameEnded {
        month:   MonthIndex,
        outcome: GameOutcome,
        won:     bool,
        reason:  String,
    },

    // ── Player action events ───────────────────────
    ExtraPaymentApplied {
        loan_id:             LoanId,
        amount:              Money,
        remaining_principal: Money,
    },
    LoanTaken {
        loan_id:   LoanId,
        principal: Money,
    },
    DecisionMade {
        cost:             Money,
        happiness_change: i32,
        stress_change:    i32,
    },
    ActionRejected {
        action: String,
        reason: String,
    },
    GameReset,
}

impl SimEvent {
    /// Stable string name of the variant, used for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::TurnAdvanced { .. }        => "turn_advanced",
            Self::LifeEventFired { .. }      => "life_event_fired",
            Self::LoanPaidOff { .. }         => "loan_paid_off",
            Self::GameEnded { .. }           => "game_ended",
            Self::ExtraPaymentApplied { .. } => "extra_payment_applied",
            Self::LoanTaken { .. }           => "loan_taken",
            Self::DecisionMade { .. }        => "decision_made",
            Self::ActionRejected { .. }      => "action_rejected",
            Self::GameReset                  => "game_reset",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub month:      MonthIndex,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}

impl EventLogEntry {
    pub fn new(run_id: &str, month: MonthIndex, event: &SimEvent) -> serde_json::Result<Self> {
        Ok(Self {
            id:         None,
            run_id:     run_id.to_string(),
            month,
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(event)?,
        })
    }
}
