use clap::Parser;
use pellet_chase_server::engine::{GameSession, GameSessionOptions};
use pellet_chase_server::rng::Rng;
use pellet_chase_server::types::{Difficulty, Direction, RuntimeEvent, Snapshot, Vec2};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    single: bool,
    #[arg(long)]
    difficulty: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    difficulty: Difficulty,
    seed: u32,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Won,
    Caught,
    TickLimit,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    difficulty: Difficulty,
    outcome: Outcome,
    ticks: u64,
    score: i32,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: i32,
    #[serde(rename = "powerPelletsEaten")]
    power_pellets_eaten: i32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "difficulty": scenario.difficulty,
                "maxTicks": scenario.max_ticks,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *outcome_counts
            .entry(outcome_key(scenario_run.result.outcome))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.result.ticks),
            json!({
                "outcome": scenario_run.result.outcome,
                "score": scenario_run.result.score,
                "pelletsEaten": scenario_run.result.pellets_eaten,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at_ms = now_ms();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at_ms,
        run_finished_at_ms,
        scenario_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut session = GameSession::new(
        scenario.difficulty,
        scenario.seed,
        GameSessionOptions::default(),
    );
    // Separate stream from the session's own rng so the driver does not
    // perturb ghost decisions.
    let mut intent_rng = Rng::new(scenario.seed ^ 0x9e37_79b9);

    let mut pellets_eaten = 0;
    let mut power_pellets_eaten = 0;
    let mut ghosts_eaten = 0;
    let mut last_score = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;

    while !session.is_terminal() && last_tick < scenario.max_ticks {
        if intent_rng.next_f32() < 0.3 {
            let intents = [
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
            ];
            session.set_next_direction(intents[intent_rng.pick_index(intents.len())]);
        }

        session.advance();
        let snapshot = session.build_snapshot(true);
        last_tick = snapshot.tick;

        for message in collect_snapshot_anomalies(&session, &snapshot, last_score) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }
        last_score = snapshot.score;

        for event in &snapshot.events {
            match event {
                RuntimeEvent::PelletEaten { .. } => pellets_eaten += 1,
                RuntimeEvent::PowerPelletEaten { .. } => power_pellets_eaten += 1,
                RuntimeEvent::GhostEaten { .. } => ghosts_eaten += 1,
                _ => {}
            }
        }
    }

    let outcome = if session.is_game_won() {
        Outcome::Won
    } else if session.is_game_over() {
        Outcome::Caught
    } else {
        Outcome::TickLimit
    };

    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            difficulty: scenario.difficulty,
            outcome,
            ticks: last_tick,
            score: session.score(),
            pellets_eaten,
            power_pellets_eaten,
            ghosts_eaten,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(
    session: &GameSession,
    snapshot: &Snapshot,
    last_score: i32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < last_score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            last_score, snapshot.score
        ));
    }
    if snapshot.player.power_mode != (snapshot.player.power_ticks_left > 0) {
        anomalies.push(format!(
            "power flag out of sync with counter: {} / {}",
            snapshot.player.power_mode, snapshot.player.power_ticks_left
        ));
    }
    if snapshot.game_over && snapshot.game_won {
        anomalies.push("game over and game won set together".to_string());
    }
    if snapshot.pellets_eaten < 0 || snapshot.pellets_eaten > snapshot.total_pellets {
        anomalies.push(format!(
            "pellet count out of range: {}/{}",
            snapshot.pellets_eaten, snapshot.total_pellets
        ));
    }

    let maze = session.maze();
    let player_pos = Vec2 {
        x: snapshot.player.x,
        y: snapshot.player.y,
    };
    if maze.is_wall(player_pos) {
        anomalies.push(format!(
            "player inside a wall at ({}, {})",
            player_pos.x, player_pos.y
        ));
    }
    for ghost in &snapshot.ghosts {
        if maze.is_wall(Vec2 {
            x: ghost.x,
            y: ghost.y,
        }) {
            anomalies.push(format!(
                "ghost {} inside a wall at ({}, {})",
                ghost.id, ghost.x, ghost.y
            ));
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(now_ms));
    let difficulty = cli
        .difficulty
        .as_deref()
        .and_then(Difficulty::parse)
        .unwrap_or(Difficulty::Medium);
    let max_ticks = cli.ticks.unwrap_or(20_000).clamp(1, 1_000_000);

    if cli.single || cli.difficulty.is_some() || cli.ticks.is_some() {
        return vec![Scenario {
            name: format!("custom-{}", difficulty.label().to_lowercase()),
            difficulty,
            seed,
            max_ticks,
        }];
    }

    vec![
        Scenario {
            name: "quick-check-easy".to_string(),
            difficulty: Difficulty::Easy,
            seed,
            max_ticks,
        },
        Scenario {
            name: "balance-check-hard".to_string(),
            difficulty: Difficulty::Hard,
            seed: normalize_seed(seed as u64 + 1),
            max_ticks,
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    run_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    RunSummary {
        run_id,
        started_at_ms,
        finished_at_ms,
        scenario_count: scenarios.len(),
        anomaly_count,
        outcome_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn outcome_key(outcome: Outcome) -> String {
    match outcome {
        Outcome::Won => "won",
        Outcome::Caught => "caught",
        Outcome::TickLimit => "tick_limit",
    }
    .to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(outcome: Outcome, score: i32) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            difficulty: Difficulty::Medium,
            outcome,
            ticks: 100,
            score,
            pellets_eaten: 0,
            power_pellets_eaten: 0,
            ghosts_eaten: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn default_run_id_contains_seed_and_timestamp() {
        assert_eq!(default_run_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_counts_scenarios() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result(Outcome::Caught, 120),
                make_scenario_result(Outcome::Won, 1700),
            ],
            BTreeMap::from([("caught".to_string(), 1usize), ("won".to_string(), 1usize)]),
            1,
        );
        assert_eq!(summary.scenario_count, 2);
        assert_eq!(summary.anomaly_count, 1);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("pellet-chase-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result(Outcome::TickLimit, 0)],
            BTreeMap::from([("tick_limit".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn clean_scenario_run_produces_no_anomalies() {
        let scenario = Scenario {
            name: "unit".to_string(),
            difficulty: Difficulty::Easy,
            seed: 1234,
            max_ticks: 500,
        };
        let run = run_scenario(&scenario);
        assert!(run.result.anomalies.is_empty());
        assert!(run.result.ticks <= 500);
    }
}
