//! Loan ledger: monthly amortization and principal pay-down.
//!
//! RULE: Loans are values. Every operation here takes the current set by
//! reference and returns a new set; nothing is mutated in place.
//! A loan whose principal reaches zero or below leaves the set at once,
//! so no negative-principal loan ever exists.

use crate::{
    error::Rejection,
    types::{LoanId, Money},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id:               LoanId,
    pub name:             String,
    pub principal:        Money,
    /// Annual rate as a fraction (0.05 = 5% APR).
    pub interest_rate:    f64,
    pub monthly_payment:  Money,
    /// Informational countdown; never drives payoff.
    pub remaining_months: u32,
}

impl Loan {
    /// Originate a fresh amortizing loan with a random id and a level
    /// annuity payment that retires it over `term_months`.
    pub fn originate(name: &str, principal: Money, annual_rate: f64, term_months: u32) -> Self {
        Self {
            id:               uuid::Uuid::new_v4().to_string(),
            name:             name.to_string(),
            principal,
            interest_rate:    annual_rate,
            monthly_payment:  annuity_payment(principal, annual_rate, term_months),
            remaining_months: term_months,
        }
    }

    /// Interest accrued over one month on the current principal.
    pub fn monthly_interest(&self) -> Money {
        self.principal * (self.interest_rate / 12.0)
    }

    /// Check that a loan is acceptable as a new debt.
    pub fn validate_terms(&self) -> Result<(), Rejection> {
        let reason = if !(self.principal > 0.0) {
            Some(format!("principal must be positive, got {}", self.principal))
        } else if !(self.monthly_payment > 0.0) {
            Some(format!("monthly payment must be positive, got {}", self.monthly_payment))
        } else if !(self.interest_rate >= 0.0) {
            Some(format!("interest rate must not be negative, got {}", self.interest_rate))
        } else if self.id.trim().is_empty() {
            Some("loan id must not be empty".to_string())
        } else {
            None
        };
        match reason {
            Some(reason) => Err(Rejection::InvalidLoanTerms { reason }),
            None => Ok(()),
        }
    }
}

/// Level monthly payment for `principal` over `term_months` at `annual_rate`.
pub fn annuity_payment(principal: Money, annual_rate: f64, term_months: u32) -> Money {
    let n = f64::from(term_months.max(1));
    let r = annual_rate / 12.0;
    if r == 0.0 {
        principal / n
    } else {
        principal * r / (1.0 - (1.0 + r).powf(-n))
    }
}

/// Sum of principal across the active set. This is always the player's
/// total debt.
pub fn total_principal(loans: &[Loan]) -> Money {
    loans.iter().map(|l| l.principal).sum()
}

/// Result of running the ledger for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerStep {
    /// Loans still outstanding after this month, in their original order.
    pub loans:             Vec<Loan>,
    /// Loans retired by this month's payment.
    pub paid_off:          Vec<Loan>,
    /// Sum of nominal monthly payments over every loan that existed
    /// before the step. Deducted from cash in full.
    pub aggregate_payment: Money,
}

/// Amortize every loan by one month.
///
/// The principal portion of a payment is `max(0, payment - interest)`:
/// a payment below accrued interest reduces nothing and never grows the
/// balance.
pub fn amortize(loans: &[Loan]) -> LedgerStep {
    let aggregate_payment = loans.iter().map(|l| l.monthly_payment).sum();
    let mut next = Vec::with_capacity(loans.len());
    let mut paid_off = Vec::new();

    for loan in loans {
        let principal_reduction = (loan.monthly_payment - loan.monthly_interest()).max(0.0);
        let updated = Loan {
            principal:        loan.principal - principal_reduction,
            remaining_months: loan.remaining_months.saturating_sub(1),
            ..loan.clone()
        };
        if updated.principal <= 0.0 {
            paid_off.push(updated);
        } else {
            next.push(updated);
        }
    }

    LedgerStep {
        loans: next,
        paid_off,
        aggregate_payment,
    }
}

/// Outcome of an extra principal payment against one loan.
#[derive(Debug, Clone, PartialEq)]
pub struct PayDown {
    pub loans:               Vec<Loan>,
    pub remaining_principal: Money,
    pub paid_off:            bool,
}

/// Apply `amount` directly to the principal of `loan_id`, flooring at zero.
/// Cash checks belong to the caller.
pub fn pay_down(loans: &[Loan], loan_id: &str, amount: Money) -> Result<PayDown, Rejection> {
    let target = loans
        .iter()
        .find(|l| l.id == loan_id)
        .ok_or_else(|| Rejection::UnknownLoan { loan_id: loan_id.to_string() })?;

    let remaining_principal = (target.principal - amount).max(0.0);
    let next = loans
        .iter()
        .map(|l| {
            if l.id == loan_id {
                Loan { principal: remaining_principal, ..l.clone() }
            } else {
                l.clone()
            }
        })
        .filter(|l| l.principal > 0.0)
        .collect();

    Ok(PayDown {
        loans: next,
        remaining_principal,
        paid_off: remaining_principal <= 0.0,
    })
}
