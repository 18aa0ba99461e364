//! Calendar arithmetic: month/year rollover and elapsed months.

use crate::types::MonthIndex;

/// The month after (`month`, `year`). December rolls into January.
pub fn next_month(month: u32, year: i32) -> (u32, i32) {
    if month + 1 > 12 {
        (1, year + 1)
    } else {
        (month + 1, year)
    }
}

/// Months elapsed since the game began, counting January of `start_year`
/// as month 1. A year before `start_year` saturates at zero.
pub fn elapsed_months(month: u32, year: i32, start_year: i32) -> MonthIndex {
    let elapsed = i64::from(year - start_year) * 12 + i64::from(month);
    elapsed.max(0) as MonthIndex
}
