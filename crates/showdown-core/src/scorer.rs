// Portfolio-aware lineup scoring.
//
// score = projection - correlation * 0.5f + uniqueness * 0.3f - overlap * 0.3f
// where f = diversity / 10. At diversity 0 the score is pure projection.

use crate::analysis::PoolAnalysis;
use crate::lineup::{Lineup, LINEUP_SIZE};
use crate::portfolio::Portfolio;

pub const MAX_DIVERSITY: f64 = 10.0;

/// Maximum captain-doubled exposure sum used to normalize correlation.
const CORRELATION_NORMALIZER: f64 = 8.0;

const CORRELATION_WEIGHT: f64 = 0.5;
const UNIQUENESS_WEIGHT: f64 = 0.3;
const OVERLAP_WEIGHT: f64 = 0.3;

/// Weight of each pool-frequency term inside the uniqueness score.
const CAPTAIN_RARITY_WEIGHT: f64 = 0.15;
const STACK_RARITY_WEIGHT: f64 = 0.15;

/// Fixed inputs shared by every score computed for one entry.
#[derive(Debug, Clone, Copy)]
pub struct ScoreContext<'a> {
    /// Highest total projection among all lineups.
    pub max_projection: f64,
    /// Total tournament dollars in the run.
    pub total_gpp_dollars: f64,
    pub analysis: &'a PoolAnalysis,
    /// 0 (pure projection) to 10 (maximum diversification).
    pub diversity: f64,
}

/// Individual score terms, before weighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub projection: f64,
    pub correlation: f64,
    pub uniqueness: f64,
    pub overlap: f64,
    pub total: f64,
}

/// Desirability of `lineup` given what the portfolio already holds.
pub fn score(lineup: &Lineup, portfolio: &Portfolio, ctx: &ScoreContext<'_>) -> f64 {
    breakdown(lineup, portfolio, ctx).total
}

pub fn breakdown(lineup: &Lineup, portfolio: &Portfolio, ctx: &ScoreContext<'_>) -> ScoreBreakdown {
    let f = ctx.diversity.clamp(0.0, MAX_DIVERSITY) / MAX_DIVERSITY;

    let projection = if ctx.max_projection > 0.0 {
        lineup.total_projection / ctx.max_projection
    } else {
        0.0
    };
    let correlation = correlation_score(lineup, portfolio, ctx.total_gpp_dollars);
    let uniqueness = uniqueness_score(lineup, ctx.analysis);
    let overlap = overlap_penalty(lineup, portfolio);

    let total = projection - correlation * (CORRELATION_WEIGHT * f)
        + uniqueness * (UNIQUENESS_WEIGHT * f)
        - overlap * (OVERLAP_WEIGHT * f);

    ScoreBreakdown {
        projection,
        correlation,
        uniqueness,
        overlap,
        total,
    }
}

/// Sum of each slot's share of committed exposure, captain counted twice.
pub fn correlation_score(lineup: &Lineup, portfolio: &Portfolio, total_gpp_dollars: f64) -> f64 {
    if portfolio.is_empty() || total_gpp_dollars <= 0.0 {
        return 0.0;
    }

    let weighted: f64 = lineup
        .slots()
        .iter()
        .map(|slot| {
            let share = portfolio.player_exposure(&slot.player_name) / total_gpp_dollars;
            if slot.is_captain {
                share * 2.0
            } else {
                share
            }
        })
        .sum();

    weighted / CORRELATION_NORMALIZER
}

/// Reward for a captain and stack that are rare in the candidate pool.
pub fn uniqueness_score(lineup: &Lineup, analysis: &PoolAnalysis) -> f64 {
    let captain_freq = analysis.captain_frequency(&lineup.captain().player_name);
    let stack_freq = analysis.stack_frequency(&lineup.dominant_stack());
    (1.0 - captain_freq) * CAPTAIN_RARITY_WEIGHT + (1.0 - stack_freq) * STACK_RARITY_WEIGHT
}

/// Mean fraction of players shared with each lineup already assigned.
pub fn overlap_penalty(lineup: &Lineup, portfolio: &Portfolio) -> f64 {
    let assigned = portfolio.assigned_lineups();
    if assigned.is_empty() {
        return 0.0;
    }
    let total: f64 = assigned
        .iter()
        .map(|other| lineup.shared_players(other) as f64 / LINEUP_SIZE as f64)
        .sum();
    total / assigned.len() as f64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
