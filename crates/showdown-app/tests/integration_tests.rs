// Integration tests for the showdown optimizer.
//
// These run the pipeline end-to-end through the library crate's public API:
// fixture CSVs are imported, lineups generated with a fixed seed, entries
// assigned, and the output files read back.

use std::fs;
use std::path::{Path, PathBuf};

use showdown_app::app;
use showdown_app::config::{load_config_from, Config};
use showdown_app::export::{ENTRIES_FILE, LINEUPS_FILE, SUMMARY_FILE};
use showdown_app::import::{load_entries, load_players};
use showdown_core::entry::{ContestKind, PatternClassifier};
use showdown_core::generator::{GenerationProgress, StopReason};

use tokio_util::sync::CancellationToken;

// ===========================================================================
// Test helpers
// ===========================================================================

/// Fixture directory path (relative to the package root, which is the cwd
/// for `cargo test`).
const FIXTURES: &str = "tests/fixtures";

fn fixture(name: &str) -> PathBuf {
    std::env::current_dir()
        .expect("cwd")
        .join(FIXTURES)
        .join(name)
}

/// Write a config pointing at the fixtures into a fresh temp dir and load it.
/// Outputs land in `<tmp>/output`.
fn fixture_config(name: &str, mode: &str, seed: u64) -> (Config, PathBuf) {
    let tmp = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&tmp);
    fs::create_dir_all(tmp.join("config")).unwrap();

    let text = format!(
        r#"
[generation]
salary_min = 40000
salary_max = 50000
projection_floor_percent = 10.0
target_count = 50
seed = {seed}

[assignment]
mode = "{mode}"
diversity_strength = 5.0
min_uniques = 1

[data_paths]
players = '{players}'
entries = '{entries}'
output_dir = "output"
"#,
        players = fixture("players.csv").display(),
        entries = fixture("entries.csv").display(),
    );
    fs::write(tmp.join("config").join("showdown.toml"), text).unwrap();

    let config = load_config_from(&tmp).expect("fixture config should load");
    (config, tmp)
}

fn no_progress(_: &GenerationProgress) {}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

// ===========================================================================
// Import
// ===========================================================================

#[test]
fn fixture_players_merge_roles() {
    let players = load_players(&fixture("players.csv")).unwrap();
    assert_eq!(players.len(), 13);

    let allen = players.iter().find(|p| p.name == "Josh Allen").unwrap();
    assert_eq!(allen.team, "BUF");
    assert_eq!(allen.flex_salary(), 11_600);
    assert_eq!(allen.cpt_salary(), 17_400);
    assert!((allen.cpt_projection() - 36.15).abs() < 1e-9);
}

#[test]
fn fixture_entries_skip_instruction_rows() {
    let entries = load_entries(&fixture("entries.csv"), &PatternClassifier::default()).unwrap();
    assert_eq!(entries.len(), 6);

    let cash = entries
        .iter()
        .filter(|e| e.kind == ContestKind::Cash)
        .count();
    assert_eq!(cash, 2);
    let gpp_dollars: f64 = entries
        .iter()
        .filter(|e| e.is_tournament())
        .map(|e| e.entry_fee)
        .sum();
    assert!((gpp_dollars - 37.0).abs() < 1e-9);
}

// ===========================================================================
// Full pipeline
// ===========================================================================

#[tokio::test]
async fn portfolio_run_writes_all_outputs() {
    let (config, tmp) = fixture_config("showdown_it_portfolio", "portfolio", 7);
    let outcome = app::run(&config, &tmp, &CancellationToken::new(), no_progress)
        .await
        .expect("pipeline should succeed");

    let summary = &outcome.summary;
    assert_eq!(summary.lineups_generated, 50);
    assert_eq!(summary.stop_reason, StopReason::TargetReached);
    assert_eq!(summary.entries, 6);
    assert_eq!(summary.cash_entries, 2);
    assert_eq!(summary.tournament_entries, 4);
    assert!((summary.total_gpp_dollars - 37.0).abs() < 1e-9);
    assert!(!summary.exposure.is_empty());
    assert!(summary.exposure.iter().all(|r| r.percent <= 100.0 + 1e-9));

    let output = tmp.join("output");
    assert_eq!(
        outcome.written,
        vec![
            output.join(ENTRIES_FILE),
            output.join(LINEUPS_FILE),
            output.join(SUMMARY_FILE)
        ]
    );

    // Assigned entries load back with every slot filled.
    let assigned = load_entries(&output.join(ENTRIES_FILE), &PatternClassifier::default()).unwrap();
    assert_eq!(assigned.len(), 6);
    assert_eq!(assigned[0].entry_id, "4500000001");
    for entry in &assigned {
        assert!(!entry.captain.is_empty(), "entry {} has no captain", entry.entry_id);
        assert!(entry.flex.iter().all(|f| !f.is_empty()));
    }

    // Both cash entries get the same (top) lineup.
    let cash: Vec<_> = assigned
        .iter()
        .filter(|e| e.kind == ContestKind::Cash)
        .collect();
    assert_eq!(cash[0].captain, cash[1].captain);
    assert_eq!(cash[0].flex, cash[1].flex);

    // Identifiers come from the salary file's display ids.
    assert!(assigned[0].captain.contains('('));

    let lineups = read(&output.join(LINEUPS_FILE));
    assert_eq!(lineups.lines().count(), 51);

    let json: serde_json::Value = serde_json::from_str(&read(&output.join(SUMMARY_FILE))).unwrap();
    assert_eq!(json["stop_reason"], "target_reached");
    assert_eq!(json["entries"], 6);

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn balanced_run_spreads_tournament_entries() {
    let (config, tmp) = fixture_config("showdown_it_balanced", "balanced", 11);
    let outcome = app::run(&config, &tmp, &CancellationToken::new(), no_progress)
        .await
        .unwrap();

    // Four tournament entries walk the top four lineups; cash reuses the first.
    assert_eq!(outcome.summary.distinct_lineups_used, 4);
    assert!(outcome.summary.exposure.is_empty());

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn same_seed_reproduces_lineups() {
    let (config_a, tmp_a) = fixture_config("showdown_it_seed_a", "portfolio", 99);
    let (config_b, tmp_b) = fixture_config("showdown_it_seed_b", "portfolio", 99);

    app::run(&config_a, &tmp_a, &CancellationToken::new(), no_progress)
        .await
        .unwrap();
    app::run(&config_b, &tmp_b, &CancellationToken::new(), no_progress)
        .await
        .unwrap();

    let a = read(&tmp_a.join("output").join(LINEUPS_FILE));
    let b = read(&tmp_b.join("output").join(LINEUPS_FILE));
    assert_eq!(a, b);
    let a = read(&tmp_a.join("output").join(ENTRIES_FILE));
    let b = read(&tmp_b.join("output").join(ENTRIES_FILE));
    assert_eq!(a, b);

    let _ = fs::remove_dir_all(&tmp_a);
    let _ = fs::remove_dir_all(&tmp_b);
}

#[tokio::test]
async fn cancelled_before_start_has_nothing_to_assign() {
    let (config, tmp) = fixture_config("showdown_it_cancelled", "portfolio", 1);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = app::run(&config, &tmp, &cancel, no_progress).await;
    let err = result.expect_err("no lineups means nothing to assign");
    assert!(format!("{err:#}").contains("assignment"));
    assert!(!tmp.join("output").exists());

    let _ = fs::remove_dir_all(&tmp);
}

#[tokio::test]
async fn missing_players_file_is_reported() {
    let (mut config, tmp) = fixture_config("showdown_it_missing", "portfolio", 1);
    config.data_paths.players = "nope.csv".into();

    let err = app::run(&config, &tmp, &CancellationToken::new(), no_progress)
        .await
        .expect_err("missing file should fail");
    assert!(format!("{err:#}").contains("player pool"));

    let _ = fs::remove_dir_all(&tmp);
}
