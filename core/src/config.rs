use crate::{
    life_event::EventCatalog,
    loan::{self, Loan},
    metrics::FinancialMetrics,
    types::{Money, MonthIndex},
};
use serde::{Deserialize, Serialize};

// ── Rules ───────────────────────────────────────────────────────────

/// Every tunable constant of the monthly transition and the end-of-game
/// checks. Fields missing from a config file take the standard value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    pub start_year:                    i32,
    pub max_months:                    MonthIndex,
    pub bankruptcy_floor:              Money,
    pub burnout_stress:                i32,
    pub victory_savings:               Money,
    pub savings_monthly_yield:         f64,
    pub event_probability:             f64,

    pub low_cash_threshold:            Money,
    pub low_cash_stress:               i32,
    pub heavy_debt_income_multiple:    f64,
    pub heavy_debt_stress:             i32,
    pub high_stress_threshold:         i32,
    pub high_stress_happiness_penalty: i32,
    pub comfortable_cash_threshold:    Money,
    pub comfortable_cash_happiness:    i32,
    pub overdraft_credit_penalty:      i32,
    pub debt_paydown_credit_bonus:     i32,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            start_year:                    2024,
            max_months:                    60, // 5 years
            bankruptcy_floor:              -1000.0,
            burnout_stress:                100,
            victory_savings:               10_000.0,
            savings_monthly_yield:         0.002, // ~2.4% APY
            event_probability:             0.3,

            low_cash_threshold:            500.0,
            low_cash_stress:               5,
            heavy_debt_income_multiple:    6.0,
            heavy_debt_stress:             2,
            high_stress_threshold:         80,
            high_stress_happiness_penalty: 5,
            comfortable_cash_threshold:    5000.0,
            comfortable_cash_happiness:    2,
            overdraft_credit_penalty:      20,
            debt_paydown_credit_bonus:     2,
        }
    }
}

// ── Starting position ───────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct StartingPositionFile {
    metrics: FinancialMetrics,
    loans:   Vec<Loan>,
    #[serde(default)]
    rules:   RuleConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct EventCatalogFile {
    events: Vec<crate::life_event::LifeEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub starting_metrics: FinancialMetrics,
    pub starting_loans:   Vec<Loan>,
    pub rules:            RuleConfig,
    pub events:           EventCatalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl GameConfig {
    /// The canonical new game: $2,000 cash, a $3,000 paycheck, $2,000 of
    /// living costs and a $15,000 student loan.
    pub fn standard() -> Self {
        let starting_loans = vec![Loan {
            id:               "student_loan".to_string(),
            name:             "Student Loan".to_string(),
            principal:        15_000.0,
            interest_rate:    0.05,
            monthly_payment:  200.0,
            remaining_months: 120,
        }];
        let rules = RuleConfig::default();
        let starting_metrics = FinancialMetrics {
            cash:             2000.0,
            monthly_income:   3000.0,
            monthly_expenses: 2000.0,
            total_debt:       loan::total_principal(&starting_loans),
            savings:          500.0,
            credit_score:     650,
            happiness:        80,
            stress:           20,
            month:            1,
            year:             rules.start_year,
        };
        Self {
            starting_metrics,
            starting_loans,
            rules,
            events: EventCatalog::standard(),
        }
    }

    /// Load from the data/ directory.
    /// In tests, use GameConfig::standard().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let start_path = format!("{data_dir}/game/starting_position.json");
        let start_content = std::fs::read_to_string(&start_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {start_path}: {e}"))?;
        let start: StartingPositionFile = serde_json::from_str(&start_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {start_path}: {e}"))?;

        let events_path = format!("{data_dir}/events/event_catalog.json");
        let events_content = std::fs::read_to_string(&events_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {events_path}: {e}"))?;
        let events_file: EventCatalogFile = serde_json::from_str(&events_content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {events_path}: {e}"))?;

        let config = Self {
            starting_metrics: start.metrics,
            starting_loans:   start.loans,
            rules:            start.rules,
            events:           EventCatalog { events: events_file.events },
        };
        config.check()?;
        log::debug!(
            "Loaded config from {data_dir}: {} loans, {} events",
            config.starting_loans.len(),
            config.events.len()
        );
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        for loan in &self.starting_loans {
            loan.validate_terms()
                .map_err(|e| anyhow::anyhow!("Starting loan '{}': {e}", loan.id))?;
        }
        let mut ids: Vec<&str> = self.starting_loans.iter().map(|l| l.id.as_str()).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            anyhow::bail!("Starting loans contain duplicate ids");
        }
        if !self.starting_metrics.indicators_in_range() {
            let m = &self.starting_metrics;
            anyhow::bail!(
                "Starting indicators out of range (happiness={}, stress={}, credit_score={})",
                m.happiness,
                m.stress,
                m.credit_score
            );
        }
        if !(1..=12).contains(&self.starting_metrics.month) {
            anyhow::bail!("Starting month {} outside 1..=12", self.starting_metrics.month);
        }
        if !(0.0..=1.0).contains(&self.rules.event_probability) {
            anyhow::bail!("event_probability {} outside [0, 1]", self.rules.event_probability);
        }
        Ok(())
    }
}
