// Player pool and contest entry loading.
//
// Reads DraftKings-style showdown salary CSVs, where each player appears once
// per roster position (CPT and FLEX rows with their own ids and salaries),
// and contest entry CSVs as downloaded for bulk editing.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use showdown_core::entry::{ContestClassifier, Entry};
use showdown_core::lineup::FLEX_SLOTS;
use showdown_core::player::{Player, RoleFigures};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// One salary-file row. Unknown columns (Game Info, etc.) are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Name + ID", default)]
    name_and_id: String,
    #[serde(rename = "Position", default)]
    position: String,
    #[serde(rename = "Roster Position", default)]
    roster_position: String,
    #[serde(rename = "Salary")]
    salary: f64,
    #[serde(rename = "TeamAbbrev", alias = "Team", default)]
    team: String,
    #[serde(rename = "AvgPointsPerGame", alias = "Projection")]
    projection: f64,
}

/// Both role rows for one (name, team) as they are collected.
#[derive(Debug, Default)]
struct PartialPlayer {
    id: String,
    position: String,
    flex: Option<RoleFigures>,
    captain: Option<RoleFigures>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub(crate) fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut order: Vec<(String, String)> = Vec::new();
    let mut partials: HashMap<(String, String), PartialPlayer> = HashMap::new();

    for result in reader.deserialize::<RawPlayerRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };

        let name = raw.name.trim().to_string();
        if !raw.salary.is_finite() || raw.salary < 0.0 || !raw.projection.is_finite() {
            warn!("skipping player '{}': non-finite salary or projection", name);
            continue;
        }

        let mut figures = RoleFigures::new(raw.salary.round() as u32, raw.projection);
        let display = raw.name_and_id.trim();
        if !display.is_empty() {
            figures = figures.with_display_id(display);
        }

        let key = (name.clone(), raw.team.trim().to_string());
        let partial = partials.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            PartialPlayer::default()
        });

        let is_captain = raw.roster_position.trim().eq_ignore_ascii_case("CPT");
        if is_captain {
            if partial.captain.is_some() {
                warn!("duplicate CPT row for '{}', using latest value", name);
            }
            partial.captain = Some(figures);
        } else {
            if partial.flex.is_some() {
                warn!("duplicate FLEX row for '{}', using latest value", name);
            }
            partial.flex = Some(figures);
        }

        // Prefer the flex row's id and position; fill from whichever comes first.
        if partial.id.is_empty() || !is_captain {
            partial.id = raw.id.trim().to_string();
        }
        if partial.position.is_empty() || !is_captain {
            partial.position = raw.position.trim().to_string();
        }
    }

    let mut players = Vec::with_capacity(order.len());
    for key in order {
        let Some(partial) = partials.remove(&key) else {
            continue;
        };
        let (name, team) = key;
        match Player::new(
            partial.id,
            name,
            team,
            partial.position,
            partial.flex,
            partial.captain,
        ) {
            Ok(player) => players.push(player),
            Err(e) => warn!("skipping player: {}", e),
        }
    }
    Ok(players)
}

/// Column positions in the entries file.
const ENTRY_ID_COL: usize = 0;
const CONTEST_NAME_COL: usize = 1;
const CONTEST_ID_COL: usize = 2;
const ENTRY_FEE_COL: usize = 3;
const CPT_COL: usize = 4;

pub(crate) fn load_entries_from_reader<R: Read>(
    rdr: R,
    classifier: &dyn ContestClassifier,
) -> Result<Vec<Entry>, csv::Error> {
    // Entries files carry a ragged instructions block to the right of the
    // entry columns, so records are read positionally.
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
    let mut entries = Vec::new();

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping malformed entry row: {}", e);
                continue;
            }
        };
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let entry_id = field(ENTRY_ID_COL);
        if entry_id.is_empty() {
            continue;
        }
        let Some(fee) = parse_fee(field(ENTRY_FEE_COL)) else {
            warn!(
                "skipping entry '{}': unreadable entry fee '{}'",
                entry_id,
                field(ENTRY_FEE_COL)
            );
            continue;
        };

        let flex = (CPT_COL + 1..=CPT_COL + FLEX_SLOTS)
            .map(|i| field(i).to_string())
            .collect();
        entries.push(
            Entry::new(
                entry_id,
                field(CONTEST_ID_COL),
                field(CONTEST_NAME_COL),
                fee,
                classifier,
            )
            .with_slots(field(CPT_COL), flex),
        );
    }
    Ok(entries)
}

/// Parse fees such as `$5`, `$0.25` or `1,500.00`.
fn parse_fee(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let fee: f64 = cleaned.trim().parse().ok()?;
    (fee.is_finite() && fee >= 0.0).then_some(fee)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn open(path: &Path) -> Result<std::fs::File, ImportError> {
    std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the player pool from a salary CSV. Errors if no usable rows remain.
pub fn load_players(path: &Path) -> Result<Vec<Player>, ImportError> {
    let players = load_players_from_reader(open(path)?).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(ImportError::Validation(format!(
            "{} produced zero valid players",
            path.display()
        )));
    }
    Ok(players)
}

/// Load contest entries, classifying each by contest name.
pub fn load_entries(
    path: &Path,
    classifier: &dyn ContestClassifier,
) -> Result<Vec<Entry>, ImportError> {
    load_entries_from_reader(open(path)?, classifier).map_err(|e| ImportError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
