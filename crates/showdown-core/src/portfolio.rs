// Dollar-weighted exposure tracking for one assignment run.

use std::collections::HashMap;

use serde::Serialize;

use crate::lineup::{Lineup, StackSignature};

/// One row of the exposure summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureRow {
    pub player: String,
    pub dollars: f64,
    /// Share of total tournament dollars, 0-100.
    pub percent: f64,
}

/// Exposure accumulated while tournament entries are assigned. Lives for a
/// single assignment run.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    player_exposure: HashMap<String, f64>,
    captain_exposure: HashMap<String, f64>,
    stack_exposure: HashMap<StackSignature, f64>,
    assigned: Vec<Lineup>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit `fee` dollars to every player, the captain, and the dominant
    /// stack of `lineup`.
    pub fn record(&mut self, lineup: &Lineup, fee: f64) {
        for slot in lineup.slots() {
            *self
                .player_exposure
                .entry(slot.player_name.clone())
                .or_insert(0.0) += fee;
        }
        *self
            .captain_exposure
            .entry(lineup.captain().player_name.clone())
            .or_insert(0.0) += fee;
        *self
            .stack_exposure
            .entry(lineup.dominant_stack())
            .or_insert(0.0) += fee;
        self.assigned.push(lineup.clone());
    }

    pub fn player_exposure(&self, name: &str) -> f64 {
        self.player_exposure.get(name).copied().unwrap_or(0.0)
    }

    pub fn captain_exposure(&self, name: &str) -> f64 {
        self.captain_exposure.get(name).copied().unwrap_or(0.0)
    }

    pub fn stack_exposure(&self, stack: &StackSignature) -> f64 {
        self.stack_exposure.get(stack).copied().unwrap_or(0.0)
    }

    pub fn player_exposures(&self) -> &HashMap<String, f64> {
        &self.player_exposure
    }

    /// Lineups recorded so far, in assignment order.
    pub fn assigned_lineups(&self) -> &[Lineup] {
        &self.assigned
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    /// Top `n` players by dollars exposed. Empty when `total_dollars` is 0.
    pub fn exposure_summary(&self, total_dollars: f64, n: usize) -> Vec<ExposureRow> {
        if total_dollars <= 0.0 {
            return Vec::new();
        }

        let mut rows: Vec<ExposureRow> = self
            .player_exposure
            .iter()
            .map(|(player, &dollars)| ExposureRow {
                player: player.clone(),
                dollars,
                percent: dollars / total_dollars * 100.0,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.dollars
                .partial_cmp(&a.dollars)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.player.cmp(&b.player))
        });
        rows.truncate(n);
        rows
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
