// Output files for a finished run: the assigned entries in upload format,
// every generated lineup, and a JSON summary of the run.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use showdown_core::analysis::PoolAnalysis;
use showdown_core::assignment::AssignmentReport;
use showdown_core::entry::Entry;
use showdown_core::generator::{GenerationReport, StopReason};
use showdown_core::lineup::{Lineup, FLEX_SLOTS};
use showdown_core::player::Player;
use showdown_core::portfolio::ExposureRow;

pub const ENTRIES_FILE: &str = "entries-assigned.csv";
pub const LINEUPS_FILE: &str = "lineups.csv";
pub const SUMMARY_FILE: &str = "summary.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error writing {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("JSON error writing {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// CSV writers
// ---------------------------------------------------------------------------

/// Write entries in the platform's upload layout. The result loads back
/// through `import::load_entries`.
pub fn write_entries<W: Write>(w: W, entries: &[Entry]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    let mut header = vec!["Entry ID", "Contest Name", "Contest ID", "Entry Fee", "CPT"];
    header.extend(std::iter::repeat("FLEX").take(FLEX_SLOTS));
    wtr.write_record(&header)?;

    for entry in entries {
        let mut record = vec![
            entry.entry_id.clone(),
            entry.contest_name.clone(),
            entry.contest_id.clone(),
            format!("${:.2}", entry.entry_fee),
            entry.captain.clone(),
        ];
        record.extend(
            (0..FLEX_SLOTS).map(|i| entry.flex.get(i).cloned().unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write one row per lineup: captain, five flex, salary, projection.
pub fn write_lineups<W: Write>(
    w: W,
    lineups: &[Lineup],
    pool: &[Player],
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(w);
    let mut header = vec!["CPT"];
    header.extend(std::iter::repeat("FLEX").take(FLEX_SLOTS));
    header.extend(["Salary", "Projection"]);
    wtr.write_record(&header)?;

    for lineup in lineups {
        let mut record: Vec<String> = lineup.slots().iter().map(|s| s.label(pool)).collect();
        record.push(lineup.total_salary.to_string());
        record.push(format!("{:.2}", lineup.total_projection));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub name: String,
    pub count: usize,
}

/// Everything worth keeping about a run besides the lineups themselves.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub lineups_generated: usize,
    pub attempts: u64,
    pub stop_reason: StopReason,
    pub elapsed_seconds: f64,
    pub entries: usize,
    pub cash_entries: usize,
    pub tournament_entries: usize,
    pub distinct_lineups_used: usize,
    pub total_gpp_dollars: f64,
    pub exposure: Vec<ExposureRow>,
    /// Most common captains in the candidate pool.
    pub chalk_captains: Vec<CountRow>,
    /// Most common dominant stacks in the candidate pool.
    pub chalk_stacks: Vec<CountRow>,
}

impl RunSummary {
    pub fn new(
        generation: &GenerationReport,
        assignment: &AssignmentReport,
        analysis: &PoolAnalysis,
        top_n: usize,
    ) -> Self {
        RunSummary {
            lineups_generated: generation.lineups.len(),
            attempts: generation.attempts,
            stop_reason: generation.stop_reason,
            elapsed_seconds: generation.elapsed.as_secs_f64(),
            entries: assignment.entries.len(),
            cash_entries: assignment.cash_entries,
            tournament_entries: assignment.tournament_entries,
            distinct_lineups_used: assignment.distinct_lineups_used,
            total_gpp_dollars: assignment.total_gpp_dollars,
            exposure: assignment.exposure.clone(),
            chalk_captains: analysis
                .top_captains(top_n)
                .into_iter()
                .map(|(name, count)| CountRow { name, count })
                .collect(),
            chalk_stacks: analysis
                .top_stacks(top_n)
                .into_iter()
                .map(|(stack, count)| CountRow {
                    name: stack.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path-based writers
// ---------------------------------------------------------------------------

fn create(path: &Path) -> Result<std::fs::File, ExportError> {
    std::fs::File::create(path).map_err(|e| ExportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn csv_err(path: &Path) -> impl FnOnce(csv::Error) -> ExportError + '_ {
    move |e| ExportError::Csv {
        path: path.display().to_string(),
        source: e,
    }
}

/// Write all three output files into `output_dir`, creating it if needed.
/// Returns the paths written.
pub fn write_outputs(
    output_dir: &Path,
    pool: &[Player],
    generation: &GenerationReport,
    assignment: &AssignmentReport,
    summary: &RunSummary,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ExportError::Io {
        path: output_dir.display().to_string(),
        source: e,
    })?;

    let entries_path = output_dir.join(ENTRIES_FILE);
    write_entries(create(&entries_path)?, &assignment.entries).map_err(csv_err(&entries_path))?;

    let lineups_path = output_dir.join(LINEUPS_FILE);
    write_lineups(create(&lineups_path)?, &generation.lineups, pool)
        .map_err(csv_err(&lineups_path))?;

    let summary_path = output_dir.join(SUMMARY_FILE);
    serde_json::to_writer_pretty(create(&summary_path)?, summary).map_err(|e| {
        ExportError::Json {
            path: summary_path.display().to_string(),
            source: e,
        }
    })?;

    info!(
        "Wrote {} entries and {} lineups to {}",
        assignment.entries.len(),
        generation.lineups.len(),
        output_dir.display()
    );
    Ok(vec![entries_path, lineups_path, summary_path])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
