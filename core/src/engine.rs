//! The monthly turn engine.
//!
//! TURN ORDER (fixed, never reordered):
//!   1. Loan ledger         amortize, collect nominal payments
//!   2. Metrics transition  cash, debt, savings, indicators, calendar
//!   3. Life event draw     zero or one event, merged onto the metrics
//!   4. Terminal check      bankruptcy, burnout, freedom, time
//!
//! RULES:
//!   - `transition` is pure: state in, state out. No I/O, no clock.
//!   - All randomness flows through the `RandomSource` passed in.
//!   - A rejected action returns the prior state untouched.
//!   - Once the game is over only `Reset` does anything.

use crate::{
    clock,
    command::GameAction,
    config::GameConfig,
    error::Rejection,
    event::SimEvent,
    loan::{self, Loan},
    rng::{RandomSource, SeededRng},
    score,
    state::{GameState, HistoryPoint},
    terminal,
    types::{LoanId, Money, RunId},
};

/// Whether an action took effect.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Applied,
    Rejected(Rejection),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Applied => None,
            Self::Rejected(r) => Some(r),
        }
    }
}

/// The full result of one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state:   GameState,
    pub outcome: ActionOutcome,
    pub events:  Vec<SimEvent>,
}

/// Apply `action` to `state`, producing the next state.
pub fn transition(
    state: &GameState,
    action: &GameAction,
    config: &GameConfig,
    rng: &mut dyn RandomSource,
) -> Transition {
    if state.is_game_over && !matches!(action, GameAction::Reset) {
        return rejected(state, action, Rejection::GameOver);
    }

    let result = match action {
        GameAction::AdvanceTurn => Ok(advance_turn(state, config, rng)),
        GameAction::ApplyExtraPayment { loan_id, amount } => {
            apply_extra_payment(state, loan_id, *amount)
        }
        GameAction::TakeLoan { loan } => take_loan(state, loan),
        GameAction::MakeDecision { cost, happiness_change, stress_change } => {
            make_decision(state, *cost, *happiness_change, *stress_change)
        }
        GameAction::Reset => Ok(reset(config)),
    };

    result.unwrap_or_else(|rejection| rejected(state, action, rejection))
}

fn rejected(state: &GameState, action: &GameAction, rejection: Rejection) -> Transition {
    log::debug!("{} rejected: {rejection}", action.name());
    Transition {
        state:   state.clone(),
        events:  vec![SimEvent::ActionRejected {
            action: action.name().to_string(),
            reason: rejection.to_string(),
        }],
        outcome: ActionOutcome::Rejected(rejection),
    }
}

fn applied(state: GameState, events: Vec<SimEvent>) -> Transition {
    Transition {
        state,
        outcome: ActionOutcome::Applied,
        events,
    }
}

// ── Turn ────────────────────────────────────────────────────────────

fn advance_turn(state: &GameState, config: &GameConfig, rng: &mut dyn RandomSource) -> Transition {
    let rules = &config.rules;
    let mut events = Vec::new();

    let ledger = loan::amortize(&state.loans);
    let next_debt = loan::total_principal(&ledger.loans);
    let mut metrics = state.metrics.advance(ledger.aggregate_payment, next_debt, rules);
    let month = clock::elapsed_months(metrics.month, metrics.year, rules.start_year);

    for paid in &ledger.paid_off {
        events.push(SimEvent::LoanPaidOff {
            month,
            loan_id: paid.id.clone(),
            name:    paid.name.clone(),
        });
    }

    let drawn = config.events.draw(rules.event_probability, rng);
    if let Some(life_event) = drawn {
        metrics = metrics.apply_impact(&life_event.impact);
        events.push(SimEvent::LifeEventFired {
            month,
            title:       life_event.title.clone(),
            description: life_event.description.clone(),
            negative:    life_event.impact.is_negative(),
        });
    }

    let point = HistoryPoint {
        month,
        cash:      metrics.cash,
        net_worth: metrics.net_worth(),
    };
    events.push(SimEvent::TurnAdvanced {
        month,
        cash:      point.cash,
        net_worth: point.net_worth,
    });

    let mut history = state.history.clone();
    history.push(point);

    let mut next = GameState {
        metrics,
        loans: ledger.loans,
        history,
        ..state.clone()
    };

    log::debug!(
        "month={month} cash={:.2} debt={:.2} savings={:.2} stress={} event={}",
        next.metrics.cash,
        next.metrics.total_debt,
        next.metrics.savings,
        next.metrics.stress,
        drawn.map_or("none", |e| e.title.as_str()),
    );

    if let Some(outcome) = terminal::evaluate(&next.metrics, &next.loans, rules) {
        next.finish(outcome);
        log::info!("Game over at month {month}: {}", outcome.reason());
        events.push(SimEvent::GameEnded {
            month,
            outcome,
            won:    outcome.is_win(),
            reason: outcome.reason().to_string(),
        });
    }

    applied(next, events)
}

// ── Player actions ──────────────────────────────────────────────────

fn apply_extra_payment(state: &GameState, loan_id: &str, amount: Money) -> Result<Transition, Rejection> {
    if !(amount > 0.0) {
        return Err(Rejection::NonPositiveAmount { amount });
    }
    if amount > state.metrics.cash {
        return Err(Rejection::InsufficientCash { amount, cash: state.metrics.cash });
    }
    let pay_down = loan::pay_down(&state.loans, loan_id, amount)?;

    let mut next = state.clone();
    next.metrics.cash -= amount;
    next.metrics.total_debt = loan::total_principal(&pay_down.loans);
    next.loans = pay_down.loans;

    let mut events = vec![SimEvent::ExtraPaymentApplied {
        loan_id:             loan_id.to_string(),
        amount,
        remaining_principal: pay_down.remaining_principal,
    }];
    if pay_down.paid_off {
        if let Some(retired) = state.loan(loan_id) {
            events.push(SimEvent::LoanPaidOff {
                month:   state.history.last().map_or(0, |p| p.month),
                loan_id: retired.id.clone(),
                name:    retired.name.clone(),
            });
        }
    }
    Ok(applied(next, events))
}

fn take_loan(state: &GameState, loan: &Loan) -> Result<Transition, Rejection> {
    if state.loan(&loan.id).is_some() {
        return Err(Rejection::DuplicateLoan { loan_id: loan.id.clone() });
    }
    loan.validate_terms()?;

    let mut next = state.clone();
    next.metrics.cash += loan.principal;
    next.loans.push(loan.clone());
    next.metrics.total_debt = loan::total_principal(&next.loans);

    Ok(applied(next, vec![SimEvent::LoanTaken {
        loan_id:   loan.id.clone(),
        principal: loan.principal,
    }]))
}

fn make_decision(
    state: &GameState,
    cost: Money,
    happiness_change: i32,
    stress_change: i32,
) -> Result<Transition, Rejection> {
    if !cost.is_finite() {
        return Err(Rejection::NonFiniteAmount { amount: cost });
    }
    if cost > state.metrics.cash {
        return Err(Rejection::InsufficientCash { amount: cost, cash: state.metrics.cash });
    }

    let mut next = state.clone();
    next.metrics.cash -= cost;
    next.metrics.happiness = next.metrics.happiness.saturating_add(happiness_change);
    next.metrics.stress = next.metrics.stress.saturating_add(stress_change);
    next.metrics = next.metrics.clamped();

    Ok(applied(next, vec![SimEvent::DecisionMade {
        cost,
        happiness_change,
        stress_change,
    }]))
}

fn reset(config: &GameConfig) -> Transition {
    log::info!("Game reset");
    applied(GameState::new_game(config), vec![SimEvent::GameReset])
}

// ── Engine ──────────────────────────────────────────────────────────

/// Owns the one live game state and the random source, and installs the
/// result of every transition atomically.
pub struct GameEngine {
    pub run_id: RunId,
    config:     GameConfig,
    state:      GameState,
    rng:        Box<dyn RandomSource>,
}

impl GameEngine {
    /// Start a new game.
    pub fn new(run_id: RunId, config: GameConfig, rng: Box<dyn RandomSource>) -> Self {
        let state = GameState::new_game(&config);
        Self { run_id, config, state, rng }
    }

    /// Start a new game on a reproducible PCG stream.
    pub fn seeded(run_id: RunId, config: GameConfig, seed: u64) -> Self {
        Self::new(run_id, config, Box::new(SeededRng::new(seed)))
    }

    /// Continue a previously saved game.
    pub fn resume(run_id: RunId, config: GameConfig, state: GameState, rng: Box<dyn RandomSource>) -> Self {
        Self { run_id, config, state, rng }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Install a loaded state in place of the live one. The random stream
    /// carries on from where it was, so a save/load mid-game does not
    /// replay earlier draws.
    pub fn replace_state(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Apply one action and install the resulting state.
    pub fn dispatch(&mut self, action: &GameAction) -> (ActionOutcome, Vec<SimEvent>) {
        let Transition { state, outcome, events } =
            transition(&self.state, action, &self.config, self.rng.as_mut());
        self.state = state;
        (outcome, events)
    }

    pub fn advance_turn(&mut self) -> Vec<SimEvent> {
        self.dispatch(&GameAction::AdvanceTurn).1
    }

    pub fn apply_extra_payment(&mut self, loan_id: &str, amount: Money) -> Result<Vec<SimEvent>, Rejection> {
        let action = GameAction::ApplyExtraPayment {
            loan_id: LoanId::from(loan_id),
            amount,
        };
        match self.dispatch(&action) {
            (ActionOutcome::Applied, events) => Ok(events),
            (ActionOutcome::Rejected(r), _) => Err(r),
        }
    }

    pub fn reset(&mut self) -> Vec<SimEvent> {
        self.dispatch(&GameAction::Reset).1
    }

    /// Play up to `n` turns, stopping early if the game ends.
    /// Returns every event emitted along the way.
    pub fn run_turns(&mut self, n: u32) -> Vec<SimEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            if self.state.is_game_over {
                break;
            }
            events.extend(self.advance_turn());
        }
        events
    }

    /// Score of a finished game; `None` while play continues.
    pub fn final_score(&self) -> Option<i64> {
        self.state
            .is_game_over
            .then(|| score::final_score(&self.state.metrics))
    }
}
