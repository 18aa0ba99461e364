//! Financial and psychological metrics, and the monthly transition
//! that advances them.
//!
//! ORDER (fixed; later steps read earlier results):
//!   1. net income = income - expenses - loan payments
//!   2. cash
//!   3. total debt (from the ledger's updated set)
//!   4. savings yield
//!   5. stress
//!   6. happiness
//!   7. credit score
//!   8. clamp happiness / stress / credit score
//!   9. calendar rollover
//!  10. event impact merge, then re-clamp (see `apply_impact`)

use crate::{clock, config::RuleConfig, types::Money};
use serde::{Deserialize, Serialize};

pub const HAPPINESS_MIN: i32 = 0;
pub const HAPPINESS_MAX: i32 = 100;
pub const STRESS_MIN: i32 = 0;
pub const STRESS_MAX: i32 = 100;
pub const CREDIT_SCORE_MIN: i32 = 300;
pub const CREDIT_SCORE_MAX: i32 = 850;

/// Snapshot of the player's finances and wellbeing for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub cash:             Money,
    pub monthly_income:   Money,
    pub monthly_expenses: Money,
    /// Always the sum of active loan principals.
    pub total_debt:       Money,
    pub savings:          Money,
    pub credit_score:     i32,
    pub happiness:        i32,
    pub stress:           i32,
    /// 1–12.
    pub month:            u32,
    pub year:             i32,
}

impl FinancialMetrics {
    /// cash + savings - total debt.
    pub fn net_worth(&self) -> Money {
        self.cash + self.savings - self.total_debt
    }

    /// Advance by one month given this month's loan obligations.
    ///
    /// `aggregate_payment` is the nominal sum the ledger billed;
    /// `next_total_debt` is the principal left on the ledger afterwards.
    pub fn advance(&self, aggregate_payment: Money, next_total_debt: Money, rules: &RuleConfig) -> Self {
        let net_income = self.monthly_income - self.monthly_expenses - aggregate_payment;
        let cash = self.cash + net_income;
        let total_debt = next_total_debt;
        let savings = self.savings * (1.0 + rules.savings_monthly_yield);

        let mut stress = self.stress;
        if cash < rules.low_cash_threshold {
            stress = stress.saturating_add(rules.low_cash_stress);
        }
        if total_debt > self.monthly_income * rules.heavy_debt_income_multiple {
            stress = stress.saturating_add(rules.heavy_debt_stress);
        }

        let mut happiness = self.happiness;
        if stress > rules.high_stress_threshold {
            happiness = happiness.saturating_sub(rules.high_stress_happiness_penalty);
        }
        if cash > rules.comfortable_cash_threshold {
            happiness = happiness.saturating_add(rules.comfortable_cash_happiness);
        }

        // Overdraft penalty and pay-down reward are exclusive; the penalty wins.
        let mut credit_score = self.credit_score;
        if cash < 0.0 {
            credit_score = credit_score.saturating_sub(rules.overdraft_credit_penalty);
        } else if total_debt < self.total_debt {
            credit_score = credit_score.saturating_add(rules.debt_paydown_credit_bonus);
        }

        let (month, year) = clock::next_month(self.month, self.year);

        Self {
            cash,
            total_debt,
            savings,
            credit_score,
            happiness,
            stress,
            month,
            year,
            ..self.clone()
        }
        .clamped()
    }

    /// Merge a one-off impact. Money fields are added as-is; the three
    /// indicators are re-clamped afterwards.
    pub fn apply_impact(&self, impact: &MetricsDelta) -> Self {
        let mut next = self.clone();
        next.cash += impact.cash.unwrap_or(0.0);
        next.monthly_income += impact.monthly_income.unwrap_or(0.0);
        next.monthly_expenses += impact.monthly_expenses.unwrap_or(0.0);
        next.savings += impact.savings.unwrap_or(0.0);
        next.happiness = next.happiness.saturating_add(impact.happiness.unwrap_or(0));
        next.stress = next.stress.saturating_add(impact.stress.unwrap_or(0));
        next.credit_score = next.credit_score.saturating_add(impact.credit_score.unwrap_or(0));
        next.clamped()
    }

    pub fn clamped(mut self) -> Self {
        self.happiness = self.happiness.clamp(HAPPINESS_MIN, HAPPINESS_MAX);
        self.stress = self.stress.clamp(STRESS_MIN, STRESS_MAX);
        self.credit_score = self.credit_score.clamp(CREDIT_SCORE_MIN, CREDIT_SCORE_MAX);
        self
    }

    /// Whether the three bounded indicators are inside their ranges.
    pub fn indicators_in_range(&self) -> bool {
        (HAPPINESS_MIN..=HAPPINESS_MAX).contains(&self.happiness)
            && (STRESS_MIN..=STRESS_MAX).contains(&self.stress)
            && (CREDIT_SCORE_MIN..=CREDIT_SCORE_MAX).contains(&self.credit_score)
    }
}

/// Field-wise deltas over the numeric metrics. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash:             Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income:   Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_expenses: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings:          Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub happiness:        Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress:           Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score:     Option<i32>,
}

impl MetricsDelta {
    /// An impact reads as bad news when it raises stress.
    pub fn is_negative(&self) -> bool {
        self.stress.is_some_and(|s| s > 0)
    }
}
