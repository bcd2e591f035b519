// Lineups: one captain plus five flex slots under a salary window.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::player::{Player, Role};

/// Players per lineup.
pub const LINEUP_SIZE: usize = 6;

/// Flex slots per lineup.
pub const FLEX_SLOTS: usize = LINEUP_SIZE - 1;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineupError {
    #[error("lineup needs {expected} slots, got {actual}")]
    WrongSlotCount { expected: usize, actual: usize },

    #[error("player '{name}' appears more than once")]
    DuplicatePlayer { name: String },

    #[error("lineup needs exactly one captain in the first slot")]
    CaptainPlacement,
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// A player placed into a lineup with the figures for its assigned role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub player_id: String,
    pub player_name: String,
    pub team: String,
    pub position: String,
    pub salary: u32,
    pub projection: f64,
    pub is_captain: bool,
}

impl LineupSlot {
    pub fn from_player(player: &Player, role: Role) -> Self {
        LineupSlot {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            team: player.team.clone(),
            position: player.position.clone(),
            salary: player.salary(role),
            projection: player.projection(role),
            is_captain: role == Role::Captain,
        }
    }

    pub fn role(&self) -> Role {
        if self.is_captain {
            Role::Captain
        } else {
            Role::Flex
        }
    }

    /// Platform identifier for this slot: the pool player's role-specific
    /// display id, or `"name (id)"` when the player is not in `pool`.
    ///
    /// Names are not unique across teams, so the pool player must match on
    /// id, name and team.
    pub fn label(&self, pool: &[Player]) -> String {
        pool.iter()
            .find(|p| self.is_for(p))
            .map(|p| p.label(self.role()))
            .unwrap_or_else(|| format!("{} ({})", self.player_name, self.player_id))
    }

    fn is_for(&self, player: &Player) -> bool {
        player.id == self.player_id && player.name == self.player_name && player.team == self.team
    }
}

// ---------------------------------------------------------------------------
// Identity and stacks
// ---------------------------------------------------------------------------

/// Canonical lineup identity: the unordered set of (player name, is captain).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineupKey(BTreeSet<(String, bool)>);

/// The team contributing the most players to a lineup, with its count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackSignature {
    pub team: String,
    pub count: usize,
}

impl std::fmt::Display for StackSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} x{}", self.team, self.count)
    }
}

// ---------------------------------------------------------------------------
// Lineup
// ---------------------------------------------------------------------------

/// Six slots, captain first, with cached salary and projection totals.
///
/// Deserializing goes through [`Lineup::from_slots`]; stored totals are
/// ignored and recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineupRecord")]
pub struct Lineup {
    slots: Vec<LineupSlot>,
    pub total_salary: u32,
    pub total_projection: f64,
}

impl Lineup {
    /// Build a lineup from a captain and five distinct flex players.
    pub fn new(captain: &Player, flex: &[&Player]) -> Result<Self, LineupError> {
        if flex.len() != FLEX_SLOTS {
            return Err(LineupError::WrongSlotCount {
                expected: LINEUP_SIZE,
                actual: flex.len() + 1,
            });
        }

        let mut seen = HashSet::with_capacity(LINEUP_SIZE);
        for player in std::iter::once(&captain).chain(flex.iter()) {
            if !seen.insert(player.name.as_str()) {
                return Err(LineupError::DuplicatePlayer {
                    name: player.name.clone(),
                });
            }
        }

        let mut slots = Vec::with_capacity(LINEUP_SIZE);
        slots.push(LineupSlot::from_player(captain, Role::Captain));
        slots.extend(flex.iter().map(|p| LineupSlot::from_player(p, Role::Flex)));

        Ok(Self::from_slots_unchecked(slots))
    }

    /// Rebuild a lineup from stored slots, checking the same invariants as
    /// [`Lineup::new`].
    pub fn from_slots(slots: Vec<LineupSlot>) -> Result<Self, LineupError> {
        if slots.len() != LINEUP_SIZE {
            return Err(LineupError::WrongSlotCount {
                expected: LINEUP_SIZE,
                actual: slots.len(),
            });
        }
        if !slots[0].is_captain || slots[1..].iter().any(|s| s.is_captain) {
            return Err(LineupError::CaptainPlacement);
        }
        let mut seen = HashSet::with_capacity(LINEUP_SIZE);
        for slot in &slots {
            if !seen.insert(slot.player_name.as_str()) {
                return Err(LineupError::DuplicatePlayer {
                    name: slot.player_name.clone(),
                });
            }
        }
        Ok(Self::from_slots_unchecked(slots))
    }

    fn from_slots_unchecked(slots: Vec<LineupSlot>) -> Self {
        let total_salary = slots.iter().map(|s| s.salary).sum();
        let total_projection = slots.iter().map(|s| s.projection).sum();
        Lineup {
            slots,
            total_salary,
            total_projection,
        }
    }

    pub fn slots(&self) -> &[LineupSlot] {
        &self.slots
    }

    pub fn captain(&self) -> &LineupSlot {
        // Construction always places the captain first.
        &self.slots[0]
    }

    pub fn flex(&self) -> &[LineupSlot] {
        &self.slots[1..]
    }

    /// Cap minus total salary. Negative if the lineup exceeds `cap`.
    pub fn salary_remaining(&self, cap: u32) -> i64 {
        cap as i64 - self.total_salary as i64
    }

    pub fn key(&self) -> LineupKey {
        LineupKey(
            self.slots
                .iter()
                .map(|s| (s.player_name.clone(), s.is_captain))
                .collect(),
        )
    }

    pub fn contains_player(&self, name: &str) -> bool {
        self.slots.iter().any(|s| s.player_name == name)
    }

    /// Number of players (by name, ignoring role) present in both lineups.
    pub fn shared_players(&self, other: &Lineup) -> usize {
        self.slots
            .iter()
            .filter(|s| other.contains_player(&s.player_name))
            .count()
    }

    /// The team with the most slots; ties go to the team seen first in slot order.
    pub fn dominant_stack(&self) -> StackSignature {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for slot in &self.slots {
            match counts.iter_mut().find(|(team, _)| *team == slot.team) {
                Some((_, count)) => *count += 1,
                None => counts.push((slot.team.as_str(), 1)),
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for (team, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((team, count));
            }
        }

        let (team, count) = best.unwrap_or(("", 0));
        StackSignature {
            team: team.to_string(),
            count,
        }
    }
}

#[derive(Deserialize)]
struct LineupRecord {
    slots: Vec<LineupSlot>,
}

impl TryFrom<LineupRecord> for Lineup {
    type Error = LineupError;

    fn try_from(record: LineupRecord) -> Result<Self, Self::Error> {
        Lineup::from_slots(record.slots)
    }
}

/// Sort lineups by total projection, highest first.
pub fn sort_by_projection(lineups: &mut [Lineup]) {
    lineups.sort_by(|a, b| {
        b.total_projection
            .partial_cmp(&a.total_projection)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
