//! debttrap-runner: headless host for the Debt Trap engine.
//!
//! Usage:
//!   debttrap-runner --seed 12345 --turns 60 --db scores.db --player ada
//!   debttrap-runner --strategy snowball --data-dir ./data
//!   debttrap-runner --ipc-mode --db scores.db

use anyhow::Result;
use debttrap_core::{
    command::GameAction,
    config::GameConfig,
    engine::{ActionOutcome, GameEngine},
    event::{EventLogEntry, SimEvent},
    rng::SeededRng,
    score::{ScoreRecord, ScoreSubmission, DEFAULT_LEADERBOARD_SIZE},
    state::GameState,
    store::SimStore,
};
use std::env;
use std::io::{self, BufRead, Write};

/// Cash the snowball strategy keeps on hand before paying down debt.
const SNOWBALL_RESERVE: f64 = 1500.0;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Action { action: GameAction },
    Save { slot: String },
    Load { slot: String },
    SubmitScore { player: String },
    Leaderboard { limit: Option<usize> },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    run_id:    &'a str,
    month:     u32,
    state:     &'a GameState,
    events:    Vec<SimEvent>,
    rejection: Option<String>,
    score:     Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Strategy {
    Passive,
    Snowball,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", rand_seed());
    let turns = parse_arg(&args, "--turns", 120u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let player = string_arg(&args, "--player").unwrap_or("runner");
    let strategy = match string_arg(&args, "--strategy").unwrap_or("passive") {
        "snowball" => Strategy::Snowball,
        "passive" => Strategy::Passive,
        other => anyhow::bail!("Unknown strategy '{other}' (expected passive|snowball)"),
    };
    let config = match string_arg(&args, "--data-dir") {
        Some(dir) => GameConfig::load(dir)?,
        None => GameConfig::standard(),
    };

    if !ipc_mode {
        println!("Debt Trap runner");
        println!("  seed:      {seed}");
        println!("  turns:     {turns}");
        println!("  db:        {db}");
        println!("  strategy:  {strategy:?}");
        println!();
    }

    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", chrono::Utc::now().timestamp());
    let mut engine = GameEngine::seeded(run_id.clone(), config, seed);

    if ipc_mode {
        run_ipc_loop(&mut engine, &store)?;
    } else {
        play(&mut engine, &store, strategy, turns)?;
        print_summary(&engine, &store, player)?;
    }

    Ok(())
}

fn play(engine: &mut GameEngine, store: &SimStore, strategy: Strategy, turns: u32) -> Result<()> {
    for _ in 0..turns {
        if engine.state().is_game_over {
            break;
        }
        if strategy == Strategy::Snowball {
            if let Some(events) = snowball_payment(engine) {
                record(engine, store, &events)?;
            }
        }
        let events = engine.advance_turn();
        for event in &events {
            if let SimEvent::LifeEventFired { title, description, negative, .. } = event {
                let marker = if *negative { "!" } else { "+" };
                println!("  [{marker}] {title}: {description}");
            }
        }
        record(engine, store, &events)?;
    }
    Ok(())
}

/// Put everything above the reserve against the smallest loan.
fn snowball_payment(engine: &mut GameEngine) -> Option<Vec<SimEvent>> {
    let state = engine.state();
    let spare = state.metrics.cash - SNOWBALL_RESERVE;
    let target = state
        .loans
        .iter()
        .min_by(|a, b| a.principal.total_cmp(&b.principal))?;
    if spare <= 0.0 {
        return None;
    }
    let amount = spare.min(target.principal);
    let loan_id = target.id.clone();
    engine.apply_extra_payment(&loan_id, amount).ok()
}

fn record(engine: &GameEngine, store: &SimStore, events: &[SimEvent]) -> Result<()> {
    let month = engine.state().elapsed_months(engine.config().rules.start_year);
    for event in events {
        store.append_event(&EventLogEntry::new(&engine.run_id, month, event)?)?;
    }
    Ok(())
}

fn run_ipc_loop(engine: &mut GameEngine, store: &SimStore) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unreadable IPC command: {e}");
                write_json(&mut stdout, &serde_json::json!({ "error": e.to_string() }))?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                write_json(&mut stdout, &ui_state(engine, Vec::new(), None))?;
            }
            IpcCommand::Action { action } => {
                let (outcome, events) = engine.dispatch(&action);
                record(engine, store, &events)?;
                let rejection = match outcome {
                    ActionOutcome::Applied => None,
                    ActionOutcome::Rejected(r) => Some(r.to_string()),
                };
                write_json(&mut stdout, &ui_state(engine, events, rejection))?;
            }
            IpcCommand::Save { slot } => {
                store.save_session(&slot, engine.state())?;
                write_json(&mut stdout, &serde_json::json!({ "saved": slot }))?;
            }
            IpcCommand::Load { slot } => match store.load_session(&slot, &engine.config().rules) {
                Ok(state) => {
                    engine.replace_state(state);
                    write_json(&mut stdout, &ui_state(engine, Vec::new(), None))?;
                }
                Err(e) => write_json(&mut stdout, &serde_json::json!({ "error": e.to_string() }))?,
            },
            IpcCommand::SubmitScore { player } => match submit_score(engine, store, &player) {
                Ok(record) => write_json(&mut stdout, &record)?,
                Err(e) => write_json(&mut stdout, &serde_json::json!({ "error": e.to_string() }))?,
            },
            IpcCommand::Leaderboard { limit } => {
                let top = store.top_scores(limit.unwrap_or(DEFAULT_LEADERBOARD_SIZE))?;
                write_json(&mut stdout, &top)?;
            }
        }
    }
    Ok(())
}

fn ui_state(engine: &GameEngine, events: Vec<SimEvent>, rejection: Option<String>) -> UiState<'_> {
    UiState {
        run_id: &engine.run_id,
        month: engine.state().elapsed_months(engine.config().rules.start_year),
        state: engine.state(),
        events,
        rejection,
        score: engine.final_score(),
    }
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    out.flush()?;
    Ok(())
}

fn submit_score(engine: &GameEngine, store: &SimStore, player: &str) -> Result<ScoreRecord> {
    let submission = ScoreSubmission::from_final_state(
        player,
        engine.state(),
        engine.config().rules.start_year,
        chrono::Utc::now(),
    )?;
    Ok(store.insert_score(&submission)?)
}

fn print_summary(engine: &GameEngine, store: &SimStore, player: &str) -> Result<()> {
    let state = engine.state();
    let m = &state.metrics;
    let months = state.elapsed_months(engine.config().rules.start_year);

    println!();
    println!("=== RUN SUMMARY ===");
    println!("  run_id:       {}", engine.run_id);
    println!("  months:       {months}");
    println!("  cash:         ${:.2}", m.cash);
    println!("  savings:      ${:.2}", m.savings);
    println!("  debt:         ${:.2}", m.total_debt);
    println!("  net worth:    ${:.2}", m.net_worth());
    println!("  credit score: {}", m.credit_score);
    println!("  happiness:    {}", m.happiness);
    println!("  stress:       {}", m.stress);

    if !state.is_game_over {
        println!();
        println!("  (game still in progress; raise --turns to play it out)");
        return Ok(());
    }

    println!(
        "  result:       {} ({})",
        if state.game_won { "WON" } else { "LOST" },
        state.game_over_reason.as_deref().unwrap_or_default()
    );

    let record = submit_score(engine, store, player)?;
    println!("  score:        {}", record.score);

    println!();
    println!("=== LEADERBOARD (Top {DEFAULT_LEADERBOARD_SIZE}) ===");
    for (rank, row) in store.top_scores(DEFAULT_LEADERBOARD_SIZE)?.iter().enumerate() {
        println!(
            "  {:>2}. {:<16} {:>8} | {:>3} months | {}",
            rank + 1,
            row.player_name,
            row.score,
            row.months_survived,
            if row.debt_free { "debt free" } else { "in debt" }
        );
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn rand_seed() -> u64 {
    SeededRng::from_entropy().seed()
}
