// Working state for one slate: the player pool and the latest generated
// lineups. Callers own the session and pass it to each step explicitly.

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::assignment::{assign_entries, AssignmentReport, AssignmentSettings};
use crate::entry::Entry;
use crate::error::EngineError;
use crate::generator::{generate, GenerationProgress, GenerationReport, GenerationSettings};
use crate::lineup::Lineup;
use crate::player::Player;

#[derive(Debug, Clone, Default)]
pub struct Session {
    players: Vec<Player>,
    generation: Option<GenerationReport>,
}

impl Session {
    pub fn new(players: Vec<Player>) -> Self {
        Session {
            players,
            generation: None,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Swap in a new player pool. Lineups built from the old pool are dropped.
    pub fn replace_players(&mut self, players: Vec<Player>) {
        self.players = players;
        self.generation = None;
    }

    /// Lineups from the most recent generation, highest projection first.
    pub fn lineups(&self) -> &[Lineup] {
        self.generation
            .as_ref()
            .map(|g| g.lineups.as_slice())
            .unwrap_or(&[])
    }

    pub fn last_generation(&self) -> Option<&GenerationReport> {
        self.generation.as_ref()
    }

    /// Generate lineups from the session's pool, replacing any earlier result.
    pub async fn generate<R, F>(
        &mut self,
        settings: &GenerationSettings,
        rng: R,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<&GenerationReport, EngineError>
    where
        R: Rng,
        F: FnMut(&GenerationProgress),
    {
        let report = generate(&self.players, settings, rng, cancel, on_progress).await?;
        Ok(self.generation.insert(report))
    }

    /// Assign the session's lineups to `entries`.
    pub fn assign(
        &self,
        entries: Vec<Entry>,
        settings: &AssignmentSettings,
    ) -> Result<AssignmentReport, EngineError> {
        assign_entries(entries, self.lineups(), &self.players, settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::AssignmentMode;
    use crate::entry::PatternClassifier;
    use crate::generator::Termination;
    use crate::lineup::tests::player;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool() -> Vec<Player> {
        (0..8)
            .map(|i| player(&format!("P{i}"), "KC", 5_000 + i * 500, 10.0 + i as f64))
            .collect()
    }

    #[tokio::test]
    async fn generate_then_assign() {
        let mut session = Session::new(pool());
        let settings = GenerationSettings::new(0, 100_000, 0.0, Termination::Count(10));
        let generated = session
            .generate(&settings, StdRng::seed_from_u64(4), &CancellationToken::new(), |_| {})
            .await
            .unwrap()
            .lineups
            .len();
        assert_eq!(generated, 10);
        assert_eq!(session.lineups().len(), 10);

        let entries = vec![Entry::new(
            "e1",
            "c1",
            "Single Entry",
            3.0,
            &PatternClassifier::default(),
        )];
        let report = session
            .assign(entries, &AssignmentSettings::new(AssignmentMode::Portfolio, 5.0))
            .unwrap();
        assert!(report.entries[0].lineup().is_some());
    }

    #[test]
    fn assign_without_lineups_fails() {
        let session = Session::new(pool());
        let entries = vec![Entry::new(
            "e1",
            "c1",
            "Single Entry",
            3.0,
            &PatternClassifier::default(),
        )];
        let err = session
            .assign(entries, &AssignmentSettings::new(AssignmentMode::Balanced, 0.0))
            .unwrap_err();
        assert_eq!(err, EngineError::NoLineups);
    }

    #[tokio::test]
    async fn replacing_players_clears_lineups() {
        let mut session = Session::new(pool());
        let settings = GenerationSettings::new(0, 100_000, 0.0, Termination::Count(5));
        session
            .generate(&settings, StdRng::seed_from_u64(4), &CancellationToken::new(), |_| {})
            .await
            .unwrap();
        assert!(!session.lineups().is_empty());

        session.replace_players(pool());
        assert!(session.lineups().is_empty());
        assert!(session.last_generation().is_none());
    }
}
