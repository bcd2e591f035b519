// Chalk analysis over a candidate subset of generated lineups.
//
// Counts how often each player, each captain, and each dominant-team stack
// appears across the top-N lineups by projection. The counts are normalized
// into frequencies by the scorer to reward contrarian captain and stack
// choices.

use std::collections::HashMap;

use crate::lineup::{Lineup, StackSignature};

/// Default number of top lineups considered during portfolio assignment.
pub const DEFAULT_CANDIDATE_POOL_SIZE: usize = 200;

/// The `size` highest-projection lineups, highest first.
pub fn candidate_pool(lineups: &[Lineup], size: usize) -> Vec<&Lineup> {
    let mut sorted: Vec<&Lineup> = lineups.iter().collect();
    sorted.sort_by(|a, b| {
        b.total_projection
            .partial_cmp(&a.total_projection)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(size);
    sorted
}

#[derive(Debug, Clone, Default)]
pub struct PoolAnalysis {
    player_counts: HashMap<String, usize>,
    captain_counts: HashMap<String, usize>,
    stack_counts: HashMap<StackSignature, usize>,
    size: usize,
}

impl PoolAnalysis {
    pub fn from_lineups(lineups: &[&Lineup]) -> Self {
        let mut analysis = PoolAnalysis {
            size: lineups.len(),
            ..Default::default()
        };

        for lineup in lineups {
            for slot in lineup.slots() {
                *analysis
                    .player_counts
                    .entry(slot.player_name.clone())
                    .or_insert(0) += 1;
                if slot.is_captain {
                    *analysis
                        .captain_counts
                        .entry(slot.player_name.clone())
                        .or_insert(0) += 1;
                }
            }
            *analysis
                .stack_counts
                .entry(lineup.dominant_stack())
                .or_insert(0) += 1;
        }

        analysis
    }

    /// Number of lineups analyzed.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn player_count(&self, name: &str) -> usize {
        self.player_counts.get(name).copied().unwrap_or(0)
    }

    pub fn captain_count(&self, name: &str) -> usize {
        self.captain_counts.get(name).copied().unwrap_or(0)
    }

    pub fn stack_count(&self, stack: &StackSignature) -> usize {
        self.stack_counts.get(stack).copied().unwrap_or(0)
    }

    pub fn player_frequency(&self, name: &str) -> f64 {
        self.frequency(self.player_count(name))
    }

    pub fn captain_frequency(&self, name: &str) -> f64 {
        self.frequency(self.captain_count(name))
    }

    pub fn stack_frequency(&self, stack: &StackSignature) -> f64 {
        self.frequency(self.stack_count(stack))
    }

    fn frequency(&self, count: usize) -> f64 {
        if self.size == 0 {
            0.0
        } else {
            count as f64 / self.size as f64
        }
    }

    /// Most frequent players, highest count first (ties by name).
    pub fn top_players(&self, n: usize) -> Vec<(String, usize)> {
        top_n(&self.player_counts, n)
    }

    /// Most frequent captains, highest count first (ties by name).
    pub fn top_captains(&self, n: usize) -> Vec<(String, usize)> {
        top_n(&self.captain_counts, n)
    }

    /// Most frequent dominant stacks, highest count first.
    pub fn top_stacks(&self, n: usize) -> Vec<(StackSignature, usize)> {
        let mut stacks: Vec<(StackSignature, usize)> = self
            .stack_counts
            .iter()
            .map(|(s, &c)| (s.clone(), c))
            .collect();
        stacks.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.team.cmp(&b.0.team))
                .then_with(|| b.0.count.cmp(&a.0.count))
        });
        stacks.truncate(n);
        stacks
    }
}

fn top_n(counts: &HashMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize)> = counts.iter().map(|(k, &v)| (k.clone(), v)).collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    rows.truncate(n);
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
