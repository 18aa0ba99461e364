//! Shared primitive types used across the entire simulation.

/// A currency amount. Signed: cash may go negative.
pub type Money = f64;

/// A stable, unique identifier for a loan.
pub type LoanId = String;

/// Months elapsed since January of the start year. One turn = one month.
pub type MonthIndex = u32;

/// The canonical run identifier used to key the event log.
pub type RunId = String;
