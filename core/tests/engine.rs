//! Engine tests: whole turns, player actions and the game-over lock.

use debttrap_core::{
    command::GameAction,
    config::GameConfig,
    engine::{transition, ActionOutcome, GameEngine},
    error::Rejection,
    event::SimEvent,
    loan::{self, Loan},
    rng::{NoEvents, ScriptedRng, SeededRng},
    state::GameState,
    terminal::GameOutcome,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn quiet_engine(config: GameConfig) -> GameEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    GameEngine::new("engine-test".into(), config, Box::new(NoEvents))
}

fn quiet_engine_from(state: GameState) -> GameEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    GameEngine::resume("engine-test".into(), GameConfig::standard(), state, Box::new(NoEvents))
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn single_loan_config(principal: f64, rate: f64, payment: f64) -> GameConfig {
    let mut config = GameConfig::standard();
    config.starting_loans = vec![Loan {
        id:               "only".into(),
        name:             "Only Loan".into(),
        principal,
        interest_rate:    rate,
        monthly_payment:  payment,
        remaining_months: 1,
    }];
    config
}

fn finished_game() -> GameEngine {
    let mut state = GameState::new_game(&GameConfig::standard());
    state.metrics.cash = -5000.0;
    let mut engine = quiet_engine_from(state);
    engine.advance_turn();
    assert!(engine.state().is_game_over, "setup: game should be over");
    engine
}

// ── Turn arithmetic ──────────────────────────────────────────────────────────

/// The canonical first month with no random event.
#[test]
fn first_month_without_event() {
    let mut engine = quiet_engine(GameConfig::standard());
    let events = engine.advance_turn();
    let state = engine.state();

    assert_eq!(state.loans.len(), 1);
    assert!(approx(state.loans[0].principal, 14_862.5));
    assert!(approx(state.metrics.total_debt, 14_862.5));
    assert_eq!(state.metrics.cash, 2800.0);
    assert!(approx(state.metrics.savings, 501.0));
    assert_eq!(state.metrics.credit_score, 652);
    assert_eq!(state.metrics.stress, 20);
    assert_eq!(state.metrics.happiness, 80);
    assert_eq!((state.metrics.month, state.metrics.year), (2, 2024));
    assert!(!state.is_game_over);

    assert_eq!(state.history.len(), 1);
    let point = &state.history[0];
    assert_eq!(point.month, 2);
    assert_eq!(point.cash, 2800.0);
    assert!(approx(point.net_worth, 2800.0 + 501.0 - 14_862.5));

    assert!(events.iter().any(|e| matches!(e, SimEvent::TurnAdvanced { month: 2, .. })));
    assert!(!events.iter().any(|e| matches!(e, SimEvent::LifeEventFired { .. })));
}

#[test]
fn loan_paid_in_one_installment_is_removed_after_one_turn() {
    let mut engine = quiet_engine(single_loan_config(1200.0, 0.0, 1200.0));
    let debt_before = engine.state().metrics.total_debt;
    assert_eq!(debt_before, 1200.0);

    let events = engine.advance_turn();
    let state = engine.state();
    assert!(state.loans.is_empty());
    assert_eq!(debt_before - state.metrics.total_debt, 1200.0);
    assert_eq!(state.metrics.cash, 2000.0 + 3000.0 - 2000.0 - 1200.0);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::LoanPaidOff { loan_id, .. } if loan_id == "only")));
}

#[test]
fn scripted_roll_fires_first_catalog_event() {
    let mut engine = GameEngine::new(
        "scripted".into(),
        GameConfig::standard(),
        Box::new(ScriptedRng::new([0.1, 0.0])),
    );
    let events = engine.advance_turn();
    let m = &engine.state().metrics;

    // Car Breakdown: -800 cash, +15 stress, -10 happiness.
    assert_eq!(m.cash, 2000.0);
    assert_eq!(m.stress, 35);
    assert_eq!(m.happiness, 70);
    assert_eq!(engine.state().history[0].cash, 2000.0);

    let fired = events.iter().find_map(|e| match e {
        SimEvent::LifeEventFired { title, negative, .. } => Some((title.clone(), *negative)),
        _ => None,
    });
    assert_eq!(fired, Some(("Car Breakdown".to_string(), true)));
}

#[test]
fn roll_above_probability_fires_nothing() {
    let mut engine = GameEngine::new(
        "scripted".into(),
        GameConfig::standard(),
        Box::new(ScriptedRng::new([0.3])),
    );
    engine.advance_turn();
    assert_eq!(engine.state().metrics.cash, 2800.0);
}

#[test]
fn promotion_is_not_flagged_negative() {
    // Index 4 of 7: a roll in [4/7, 5/7).
    let mut engine = GameEngine::new(
        "scripted".into(),
        GameConfig::standard(),
        Box::new(ScriptedRng::new([0.0, 0.6])),
    );
    let events = engine.advance_turn();
    assert_eq!(engine.state().metrics.monthly_income, 3500.0);
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::LifeEventFired { title, negative: false, .. } if title == "Promotion!"
    )));
}

/// The event lands before the end-of-game check, so a shock can bankrupt.
#[test]
fn event_is_merged_before_terminal_check() {
    let mut state = GameState::new_game(&GameConfig::standard());
    state.metrics.cash = -1300.0; // -500 after the month, -1300 after the breakdown
    let mut engine = GameEngine::resume(
        "shock".into(),
        GameConfig::standard(),
        state,
        Box::new(ScriptedRng::new([0.0, 0.0])),
    );
    engine.advance_turn();
    let state = engine.state();
    assert_eq!(state.metrics.cash, -1300.0);
    assert!(state.is_game_over);
    assert!(!state.game_won);
    assert_eq!(state.game_over_reason.as_deref(), Some(GameOutcome::Bankruptcy.reason()));
}

// ── Endings ──────────────────────────────────────────────────────────────────

#[test]
fn bankruptcy_reported_over_simultaneous_burnout() {
    let mut state = GameState::new_game(&GameConfig::standard());
    state.metrics.cash = -900.0;
    state.metrics.monthly_income = 0.0;
    state.metrics.monthly_expenses = 500.0;
    state.metrics.stress = 99;
    let mut engine = quiet_engine_from(state);

    let events = engine.advance_turn();
    let state = engine.state();
    assert!(state.metrics.cash < -1000.0);
    assert_eq!(state.metrics.stress, 100);
    assert_eq!(state.game_over_reason.as_deref(), Some(GameOutcome::Bankruptcy.reason()));
    assert!(events.iter().any(|e| matches!(
        e,
        SimEvent::GameEnded { outcome: GameOutcome::Bankruptcy, won: false, .. }
    )));
}

#[test]
fn savings_past_target_with_no_debt_wins() {
    let mut config = GameConfig::standard();
    config.starting_loans.clear();
    config.starting_metrics.cash = 100.0;
    config.starting_metrics.monthly_income = 2000.0;
    config.starting_metrics.savings = 9990.0; // 10,009.98 after yield
    let mut engine = quiet_engine(config);

    engine.advance_turn();
    let state = engine.state();
    assert!(state.is_game_over);
    assert!(state.game_won);
    assert!(state
        .game_over_reason
        .as_deref()
        .is_some_and(|r| r.contains("Financial Freedom")));
    assert_eq!(engine.final_score(), Some(debttrap_core::score::final_score(&state.metrics)));
}

#[test]
fn clock_runs_out_after_sixty_turns() {
    let mut engine = quiet_engine(GameConfig::standard());
    engine.run_turns(500);
    let state = engine.state();
    assert!(state.is_game_over);
    assert!(!state.game_won);
    assert_eq!(state.history.len(), 60);
    assert_eq!(state.history.last().map(|p| p.month), Some(61));
    assert_eq!(state.game_over_reason.as_deref(), Some(GameOutcome::TimeExpired.reason()));
}

#[test]
fn game_over_locks_turns_and_payments() {
    let mut engine = finished_game();
    let frozen = engine.state().clone();

    for _ in 0..3 {
        let (outcome, events) = engine.dispatch(&GameAction::AdvanceTurn);
        assert_eq!(outcome, ActionOutcome::Rejected(Rejection::GameOver));
        assert!(matches!(events.as_slice(), [SimEvent::ActionRejected { .. }]));
        assert_eq!(engine.state(), &frozen);
    }
    assert_eq!(
        engine.apply_extra_payment("student_loan", 1.0),
        Err(Rejection::GameOver)
    );
    assert_eq!(engine.state(), &frozen);
    assert!(engine.run_turns(10).is_empty());
    assert_eq!(engine.state(), &frozen);
}

#[test]
fn reset_restores_the_starting_position() {
    let mut engine = finished_game();
    let events = engine.reset();
    assert_eq!(engine.state(), &GameState::new_game(&GameConfig::standard()));
    assert_eq!(events, vec![SimEvent::GameReset]);
    assert!(engine.final_score().is_none());

    engine.advance_turn();
    assert_eq!(engine.state().history.len(), 1);
}

// ── Extra payments ───────────────────────────────────────────────────────────

#[test]
fn extra_payment_moves_cash_into_principal() {
    let mut engine = quiet_engine(GameConfig::standard());
    let events = engine.apply_extra_payment("student_loan", 500.0).unwrap();
    let state = engine.state();

    assert_eq!(state.metrics.cash, 1500.0);
    assert_eq!(state.loans[0].principal, 14_500.0);
    assert_eq!(state.metrics.total_debt, 14_500.0);
    assert!(state.history.is_empty(), "extra payment must not consume a turn");
    assert_eq!(state.metrics.month, 1);
    assert!(matches!(
        events.as_slice(),
        [SimEvent::ExtraPaymentApplied { remaining_principal, .. }] if *remaining_principal == 14_500.0
    ));
}

#[test]
fn overpaying_retires_the_loan_and_skips_terminal_check() {
    let mut state = GameState::new_game(&GameConfig::standard());
    state.metrics.cash = 20_000.0;
    state.metrics.savings = 50_000.0;
    let mut engine = quiet_engine_from(state);

    engine.apply_extra_payment("student_loan", 16_000.0).unwrap();
    let state = engine.state();
    assert!(state.loans.is_empty());
    assert_eq!(state.metrics.total_debt, 0.0);
    assert_eq!(state.metrics.cash, 4000.0);
    // Debt free and rich, but only a turn can end the game.
    assert!(!state.is_game_over);

    engine.advance_turn();
    assert!(engine.state().game_won);
}

#[test]
fn extra_payment_over_cash_changes_nothing() {
    let mut engine = quiet_engine(GameConfig::standard());
    let before = engine.state().clone();
    let result = engine.apply_extra_payment("student_loan", 2000.01);
    assert_eq!(
        result,
        Err(Rejection::InsufficientCash { amount: 2000.01, cash: 2000.0 })
    );
    assert_eq!(engine.state(), &before);
    assert_eq!(
        serde_json::to_string(engine.state()).unwrap(),
        serde_json::to_string(&before).unwrap()
    );
}

#[test]
fn extra_payment_of_all_cash_is_allowed() {
    let mut engine = quiet_engine(GameConfig::standard());
    assert!(engine.apply_extra_payment("student_loan", 2000.0).is_ok());
    assert_eq!(engine.state().metrics.cash, 0.0);
}

#[test]
fn extra_payment_rejects_bad_amounts_and_ids() {
    let mut engine = quiet_engine(GameConfig::standard());
    let before = engine.state().clone();

    assert_eq!(
        engine.apply_extra_payment("student_loan", 0.0),
        Err(Rejection::NonPositiveAmount { amount: 0.0 })
    );
    assert!(matches!(
        engine.apply_extra_payment("student_loan", -50.0),
        Err(Rejection::NonPositiveAmount { .. })
    ));
    assert!(matches!(
        engine.apply_extra_payment("student_loan", f64::NAN),
        Err(Rejection::NonPositiveAmount { .. })
    ));
    assert_eq!(
        engine.apply_extra_payment("car_loan", 10.0),
        Err(Rejection::UnknownLoan { loan_id: "car_loan".into() })
    );
    assert_eq!(engine.state(), &before);
}

// ── Loans and decisions ──────────────────────────────────────────────────────

#[test]
fn taking_a_loan_pays_out_principal() {
    let mut engine = quiet_engine(GameConfig::standard());
    let car = Loan::originate("Car Loan", 6000.0, 0.07, 48);
    let car_id = car.id.clone();

    let (outcome, events) = engine.dispatch(&GameAction::TakeLoan { loan: car });
    assert!(outcome.is_applied());
    let state = engine.state();
    assert_eq!(state.metrics.cash, 8000.0);
    assert_eq!(state.loans.len(), 2);
    assert_eq!(state.loans[1].id, car_id);
    assert_eq!(state.metrics.total_debt, loan::total_principal(&state.loans));
    assert_eq!(state.metrics.total_debt, 21_000.0);
    assert!(matches!(events.as_slice(), [SimEvent::LoanTaken { .. }]));
}

#[test]
fn duplicate_or_invalid_loans_are_refused() {
    let mut engine = quiet_engine(GameConfig::standard());
    let before = engine.state().clone();

    let mut dup = Loan::originate("Refi", 1000.0, 0.05, 12);
    dup.id = "student_loan".into();
    let (outcome, _) = engine.dispatch(&GameAction::TakeLoan { loan: dup });
    assert_eq!(
        outcome.rejection(),
        Some(&Rejection::DuplicateLoan { loan_id: "student_loan".into() })
    );

    let mut free_money = Loan::originate("Free", 1000.0, 0.05, 12);
    free_money.monthly_payment = 0.0;
    let (outcome, _) = engine.dispatch(&GameAction::TakeLoan { loan: free_money });
    assert!(matches!(outcome.rejection(), Some(Rejection::InvalidLoanTerms { .. })));

    assert_eq!(engine.state(), &before);
}

#[test]
fn decisions_trade_cash_for_wellbeing() {
    let mut engine = quiet_engine(GameConfig::standard());
    let (outcome, _) = engine.dispatch(&GameAction::MakeDecision {
        cost:             300.0,
        happiness_change: 50,
        stress_change:    -30,
    });
    assert!(outcome.is_applied());
    let m = &engine.state().metrics;
    assert_eq!(m.cash, 1700.0);
    assert_eq!(m.happiness, 100);
    assert_eq!(m.stress, 0);
}

#[test]
fn unaffordable_decision_is_refused() {
    let mut engine = quiet_engine(GameConfig::standard());
    let before = engine.state().clone();
    let (outcome, _) = engine.dispatch(&GameAction::MakeDecision {
        cost:             5000.0,
        happiness_change: 10,
        stress_change:    0,
    });
    assert!(matches!(outcome, ActionOutcome::Rejected(Rejection::InsufficientCash { .. })));
    assert_eq!(engine.state(), &before);
}

#[test]
fn extreme_decision_changes_saturate_then_clamp() {
    let mut engine = quiet_engine(GameConfig::standard());
    let (outcome, _) = engine.dispatch(&GameAction::MakeDecision {
        cost:             0.0,
        happiness_change: i32::MAX,
        stress_change:    i32::MIN,
    });
    assert!(outcome.is_applied());
    let m = &engine.state().metrics;
    assert_eq!(m.happiness, 100);
    assert_eq!(m.stress, 0);
}

#[test]
fn non_finite_decision_cost_is_refused() {
    let mut engine = quiet_engine(GameConfig::standard());
    let before = engine.state().clone();
    for cost in [f64::NAN, f64::NEG_INFINITY] {
        let (outcome, _) = engine.dispatch(&GameAction::MakeDecision {
            cost,
            happiness_change: 10,
            stress_change:    -10,
        });
        assert!(matches!(outcome, ActionOutcome::Rejected(Rejection::NonFiniteAmount { .. })));
        assert_eq!(engine.state(), &before);
    }
}

// ── Invariants ───────────────────────────────────────────────────────────────

/// Across many random games with a debt-snowballing player, debt always
/// equals the loans' principal and the indicators stay in range.
#[test]
fn invariants_hold_across_random_games() {
    let config = GameConfig::standard();
    for seed in 0..64u64 {
        let mut rng = SeededRng::new(seed);
        let mut state = GameState::new_game(&config);
        let extra = GameConfig::standard().starting_loans[0].id.clone();

        for turn in 0..120 {
            let action = if turn % 3 == 0 && state.metrics.cash > 1000.0 {
                GameAction::ApplyExtraPayment { loan_id: extra.clone(), amount: 500.0 }
            } else {
                GameAction::AdvanceTurn
            };
            let next = transition(&state, &action, &config, &mut rng).state;

            let expected = loan::total_principal(&next.loans);
            assert!(
                (next.metrics.total_debt - expected).abs() < 1e-6,
                "seed={seed} turn={turn}: total_debt {} != principal sum {expected}",
                next.metrics.total_debt
            );
            assert!(
                next.metrics.indicators_in_range(),
                "seed={seed} turn={turn}: indicators out of range {:?}",
                next.metrics
            );
            assert!(next.loans.iter().all(|l| l.principal > 0.0));
            assert_eq!(next.is_game_over, next.game_over_reason.is_some());
            if state.is_game_over {
                assert_eq!(next, state, "seed={seed}: state changed after game over");
            }
            state = next;
        }
        assert!(state.is_game_over, "seed={seed}: the game must end within its time limit");
    }
}
