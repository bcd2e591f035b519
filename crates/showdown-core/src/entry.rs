// Paid contest entries and cash/tournament classification.

use serde::{Deserialize, Serialize};

use crate::lineup::Lineup;
use crate::player::Player;

/// Default case-insensitive tokens marking a contest name as a cash game.
pub const DEFAULT_CASH_PATTERNS: &[&str] = &["double", " vs", "50/50", "h2h", "head-to-head"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestKind {
    /// Head-to-head, double-up and similar flat-payout formats.
    Cash,
    /// Guaranteed prize pool tournaments.
    Tournament,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Decides whether a contest is a cash game from its name.
pub trait ContestClassifier {
    fn classify(&self, contest_name: &str) -> ContestKind;
}

/// Matches contest names against substring tokens, ignoring case.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternClassifier {
    patterns: Vec<String>,
}

impl PatternClassifier {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        PatternClassifier {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

impl Default for PatternClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_CASH_PATTERNS)
    }
}

impl ContestClassifier for PatternClassifier {
    fn classify(&self, contest_name: &str) -> ContestKind {
        let name = contest_name.to_lowercase();
        if self.patterns.iter().any(|p| name.contains(p.as_str())) {
            ContestKind::Cash
        } else {
            ContestKind::Tournament
        }
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// A paid contest slot. Only the assignment engine rebinds its lineup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub entry_id: String,
    pub contest_id: String,
    pub contest_name: String,
    pub entry_fee: f64,
    pub kind: ContestKind,
    /// Captain identifier as displayed by the contest platform.
    pub captain: String,
    /// Flex identifiers as displayed by the contest platform.
    pub flex: Vec<String>,
    pub salary: u32,
    pub projection: f64,
    lineup: Option<Lineup>,
}

impl Entry {
    pub fn new(
        entry_id: impl Into<String>,
        contest_id: impl Into<String>,
        contest_name: impl Into<String>,
        entry_fee: f64,
        classifier: &dyn ContestClassifier,
    ) -> Self {
        let contest_name = contest_name.into();
        let kind = classifier.classify(&contest_name);
        Entry {
            entry_id: entry_id.into(),
            contest_id: contest_id.into(),
            contest_name,
            entry_fee,
            kind,
            captain: String::new(),
            flex: Vec::new(),
            salary: 0,
            projection: 0.0,
            lineup: None,
        }
    }

    /// Keep the identifiers already present in the source file.
    pub fn with_slots(mut self, captain: impl Into<String>, flex: Vec<String>) -> Self {
        self.captain = captain.into();
        self.flex = flex;
        self
    }

    pub fn is_tournament(&self) -> bool {
        self.kind == ContestKind::Tournament
    }

    pub fn lineup(&self) -> Option<&Lineup> {
        self.lineup.as_ref()
    }

    /// Bind `lineup` and mirror its identifiers, salary and projection.
    ///
    /// Identifiers come from the matching pool player's role-specific display
    /// id when available, otherwise `"name (id)"`.
    pub fn bind(&mut self, lineup: &Lineup, pool: &[Player]) {
        self.captain = lineup.captain().label(pool);
        self.flex = lineup.flex().iter().map(|s| s.label(pool)).collect();
        self.salary = lineup.total_salary;
        self.projection = lineup.total_projection;
        self.lineup = Some(lineup.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lineup::tests::lineup_of;
    use crate::player::RoleFigures;

    #[test]
    fn default_patterns_classify_cash_games() {
        let c = PatternClassifier::default();
        assert_eq!(c.classify("NFL Showdown $5 Double Up"), ContestKind::Cash);
        assert_eq!(c.classify("NFL $25 Head-to-Head"), ContestKind::Cash);
        assert_eq!(c.classify("KC vs BUF $1 H2H"), ContestKind::Cash);
        assert_eq!(c.classify("NFL $10 50/50"), ContestKind::Cash);
        assert_eq!(
            c.classify("NFL Showdown $100K Millionaire Maker"),
            ContestKind::Tournament
        );
    }

    #[test]
    fn custom_patterns_replace_defaults() {
        let c = PatternClassifier::new(["Triple"]);
        assert_eq!(c.classify("$3 TRIPLE UP"), ContestKind::Cash);
        assert_eq!(c.classify("$5 Double Up"), ContestKind::Tournament);
    }

    #[test]
    fn bind_uses_display_ids_then_fallback() {
        let mut pool: Vec<Player> = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .enumerate()
            .map(|(i, n)| {
                Player::new(
                    format!("{i}"),
                    *n,
                    "KC",
                    "WR",
                    Some(RoleFigures::new(5_000, 10.0)),
                    None,
                )
                .unwrap()
            })
            .collect();
        pool[0] = Player::new(
            "0",
            "A",
            "KC",
            "QB",
            Some(RoleFigures::new(5_000, 10.0).with_display_id("A (100)")),
            Some(RoleFigures::new(7_500, 15.0).with_display_id("A (200)")),
        )
        .unwrap();

        let lineup = lineup_of(&pool, ["A", "B", "C", "D", "E", "F"]);
        let mut entry = Entry::new("e1", "c1", "Millionaire Maker", 20.0, &PatternClassifier::default());
        entry.bind(&lineup, &pool);

        assert_eq!(entry.captain, "A (200)");
        assert_eq!(entry.flex, vec!["B (1)", "C (2)", "D (3)", "E (4)", "F (5)"]);
        assert_eq!(entry.salary, lineup.total_salary);
        assert_eq!(entry.projection, lineup.total_projection);
        assert_eq!(entry.lineup(), Some(&lineup));
        assert!(entry.is_tournament());
    }
}
