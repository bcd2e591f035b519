// Entry assignment: bind one lineup to every contest entry.
//
// Cash entries always receive the single highest-projection lineup.
// Tournament entries are handled by one of two modes:
//
// - Balanced: descending projection order, one lineup per entry, wrapping
//   back to the top once every lineup has been used.
// - Portfolio: entries in descending fee order each take the best-scoring
//   lineup from the candidate pool against the exposure committed so far.
//   Each pick depends on every earlier pick, so entries are processed
//   strictly one after another.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::{candidate_pool, PoolAnalysis, DEFAULT_CANDIDATE_POOL_SIZE};
use crate::entry::Entry;
use crate::error::EngineError;
use crate::lineup::{Lineup, LINEUP_SIZE};
use crate::player::Player;
use crate::portfolio::{ExposureRow, Portfolio};
use crate::scorer::{self, ScoreContext, MAX_DIVERSITY};

pub const DEFAULT_EXPOSURE_TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    Balanced,
    Portfolio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSettings {
    pub mode: AssignmentMode,
    /// 0 (pure projection) to 10 (maximum diversification). Portfolio mode only.
    pub diversity: f64,
    /// Minimum players each tournament lineup must have that are absent from
    /// every lineup assigned before it. 0 disables. Portfolio mode only.
    pub min_uniques: usize,
    pub candidate_pool_size: usize,
    pub exposure_top_n: usize,
}

impl AssignmentSettings {
    pub fn new(mode: AssignmentMode, diversity: f64) -> Self {
        AssignmentSettings {
            mode,
            diversity,
            min_uniques: 0,
            candidate_pool_size: DEFAULT_CANDIDATE_POOL_SIZE,
            exposure_top_n: DEFAULT_EXPOSURE_TOP_N,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=MAX_DIVERSITY).contains(&self.diversity) {
            return Err(EngineError::invalid(
                "diversity_strength",
                format!("must be between 0 and 10, got {}", self.diversity),
            ));
        }
        if self.min_uniques > LINEUP_SIZE {
            return Err(EngineError::invalid(
                "min_uniques",
                format!("must be at most {LINEUP_SIZE}, got {}", self.min_uniques),
            ));
        }
        if self.candidate_pool_size == 0 {
            return Err(EngineError::invalid(
                "candidate_pool_size",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct AssignmentReport {
    /// Entries in their original order, each bound to a lineup.
    pub entries: Vec<Entry>,
    pub cash_entries: usize,
    pub tournament_entries: usize,
    pub distinct_lineups_used: usize,
    pub total_gpp_dollars: f64,
    /// Top players by tournament dollar exposure. Portfolio mode only.
    pub exposure: Vec<ExposureRow>,
}

/// Bind a lineup to every entry.
pub fn assign_entries(
    mut entries: Vec<Entry>,
    lineups: &[Lineup],
    pool: &[Player],
    settings: &AssignmentSettings,
) -> Result<AssignmentReport, EngineError> {
    settings.validate()?;
    if entries.is_empty() {
        return Err(EngineError::NoEntries);
    }
    if lineups.is_empty() {
        return Err(EngineError::NoLineups);
    }

    let sorted = candidate_pool(lineups, lineups.len());
    let best = sorted[0];

    let mut cash_entries = 0;
    let mut tournament: Vec<usize> = Vec::new();
    for (i, entry) in entries.iter_mut().enumerate() {
        if entry.is_tournament() {
            tournament.push(i);
        } else {
            entry.bind(best, pool);
            cash_entries += 1;
        }
    }

    let total_gpp_dollars: f64 = tournament.iter().map(|&i| entries[i].entry_fee).sum();

    let exposure = match settings.mode {
        AssignmentMode::Balanced => {
            assign_balanced(&mut entries, &tournament, &sorted, pool);
            Vec::new()
        }
        AssignmentMode::Portfolio => {
            let portfolio = assign_portfolio(
                &mut entries,
                &tournament,
                lineups,
                pool,
                settings,
                total_gpp_dollars,
            );
            portfolio.exposure_summary(total_gpp_dollars, settings.exposure_top_n)
        }
    };

    let distinct_lineups_used = entries
        .iter()
        .filter_map(|e| e.lineup().map(Lineup::key))
        .collect::<HashSet<_>>()
        .len();

    info!(
        mode = ?settings.mode,
        cash = cash_entries,
        tournament = tournament.len(),
        distinct_lineups = distinct_lineups_used,
        gpp_dollars = total_gpp_dollars,
        "entry assignment complete"
    );

    Ok(AssignmentReport {
        entries,
        cash_entries,
        tournament_entries: tournament.len(),
        distinct_lineups_used,
        total_gpp_dollars,
        exposure,
    })
}

fn assign_balanced(entries: &mut [Entry], tournament: &[usize], sorted: &[&Lineup], pool: &[Player]) {
    if tournament.len() > sorted.len() {
        warn!(
            entries = tournament.len(),
            lineups = sorted.len(),
            "fewer lineups than tournament entries, reusing from the top"
        );
    }
    for (n, &i) in tournament.iter().enumerate() {
        entries[i].bind(sorted[n % sorted.len()], pool);
    }
}

fn assign_portfolio(
    entries: &mut [Entry],
    tournament: &[usize],
    lineups: &[Lineup],
    pool: &[Player],
    settings: &AssignmentSettings,
    total_gpp_dollars: f64,
) -> Portfolio {
    let mut portfolio = Portfolio::new();
    if tournament.is_empty() {
        return portfolio;
    }

    let candidates = candidate_pool(lineups, settings.candidate_pool_size);
    let analysis = PoolAnalysis::from_lineups(&candidates);
    let ctx = ScoreContext {
        max_projection: candidates[0].total_projection,
        total_gpp_dollars,
        analysis: &analysis,
        diversity: settings.diversity,
    };

    let mut order = tournament.to_vec();
    order.sort_by(|&a, &b| {
        entries[b]
            .entry_fee
            .partial_cmp(&entries[a].entry_fee)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for i in order {
        let allowed: Vec<&Lineup> = candidates
            .iter()
            .copied()
            .filter(|c| meets_min_uniques(c, &portfolio, settings.min_uniques))
            .collect();
        let pickable = if allowed.is_empty() {
            warn!(
                entry = %entries[i].entry_id,
                min_uniques = settings.min_uniques,
                "no candidate satisfies min_uniques, ignoring it for this entry"
            );
            &candidates
        } else {
            &allowed
        };

        let Some(chosen) = best_scoring(pickable, &portfolio, &ctx) else {
            continue;
        };
        debug!(
            entry = %entries[i].entry_id,
            fee = entries[i].entry_fee,
            projection = chosen.total_projection,
            "assigned tournament entry"
        );
        entries[i].bind(chosen, pool);
        portfolio.record(chosen, entries[i].entry_fee);
    }

    portfolio
}

/// Highest score wins; the first candidate seen keeps ties.
fn best_scoring<'a>(
    candidates: &[&'a Lineup],
    portfolio: &Portfolio,
    ctx: &ScoreContext<'_>,
) -> Option<&'a Lineup> {
    let mut best: Option<(&'a Lineup, f64)> = None;
    for &candidate in candidates {
        let s = scorer::score(candidate, portfolio, ctx);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((candidate, s));
        }
    }
    best.map(|(lineup, _)| lineup)
}

fn meets_min_uniques(candidate: &Lineup, portfolio: &Portfolio, min_uniques: usize) -> bool {
    min_uniques == 0
        || portfolio
            .assigned_lineups()
            .iter()
            .all(|held| LINEUP_SIZE - candidate.shared_players(held) >= min_uniques)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
