// Lineup generation by value-weighted random sampling.
//
// Each attempt draws six distinct players weighted by value (points per
// $1000), picks a captain among them weighted by flex projection, and keeps
// the lineup if its salary lands inside the configured window and its
// canonical key has not been seen before. Attempts run in batches; between
// batches the generator checks for cancellation, re-evaluates the time
// budget, reports progress, and yields to the runtime.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::lineup::{sort_by_projection, Lineup, LineupKey, LINEUP_SIZE};
use crate::player::{eligible_players, Player};
use crate::sampling::{weighted_pick, weighted_sample_without_replacement};

/// Count mode gives up after `target * ATTEMPTS_PER_TARGET` attempts.
pub const ATTEMPTS_PER_TARGET: u64 = 100;

pub const DEFAULT_BATCH_SIZE: usize = 1000;

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// When generation stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// Stop after this many unique lineups (or when the attempt cap is hit).
    Count(usize),
    /// Stop once this much wall-clock time has elapsed. No attempt cap.
    Duration(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub salary_min: u32,
    pub salary_max: u32,
    /// Minimum flex projection as a percentage of the pool's best.
    pub projection_floor_percent: f64,
    pub termination: Termination,
    pub batch_size: usize,
    pub progress_interval: Duration,
}

impl GenerationSettings {
    pub fn new(
        salary_min: u32,
        salary_max: u32,
        projection_floor_percent: f64,
        termination: Termination,
    ) -> Self {
        GenerationSettings {
            salary_min,
            salary_max,
            projection_floor_percent,
            termination,
            batch_size: DEFAULT_BATCH_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.salary_max == 0 {
            return Err(EngineError::invalid("salary_max", "must be greater than 0"));
        }
        if self.salary_min > self.salary_max {
            return Err(EngineError::invalid(
                "salary_min",
                format!(
                    "must not exceed salary_max ({} > {})",
                    self.salary_min, self.salary_max
                ),
            ));
        }
        if !(0.0..=100.0).contains(&self.projection_floor_percent) {
            return Err(EngineError::invalid(
                "projection_floor_percent",
                format!(
                    "must be between 0 and 100, got {}",
                    self.projection_floor_percent
                ),
            ));
        }
        match self.termination {
            Termination::Count(0) => {
                return Err(EngineError::invalid("target_count", "must be greater than 0"));
            }
            Termination::Duration(d) if d.is_zero() => {
                return Err(EngineError::invalid(
                    "max_duration_seconds",
                    "must be greater than 0",
                ));
            }
            _ => {}
        }
        if self.batch_size == 0 {
            return Err(EngineError::invalid("batch_size", "must be greater than 0"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Progress and results
// ---------------------------------------------------------------------------

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationProgress {
    pub generated: usize,
    pub attempts: u64,
    pub elapsed: Duration,
    pub termination: Termination,
    /// Unique lineups per second so far.
    pub rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    /// Count mode hit its attempt cap before the target.
    Exhausted,
    TimeElapsed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Unique lineups, highest total projection first.
    pub lineups: Vec<Lineup>,
    pub attempts: u64,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

pub struct LineupGenerator<R> {
    players: Vec<Player>,
    values: Vec<f64>,
    settings: GenerationSettings,
    rng: R,
    seen: HashSet<LineupKey>,
    lineups: Vec<Lineup>,
    attempts: u64,
}

impl<R: Rng> LineupGenerator<R> {
    /// Create a generator over an already floor-filtered player list.
    pub fn new(
        eligible: Vec<Player>,
        settings: GenerationSettings,
        rng: R,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        if eligible.len() < LINEUP_SIZE {
            return Err(EngineError::InsufficientPool {
                eligible: eligible.len(),
                required: LINEUP_SIZE,
            });
        }

        let values = eligible.iter().map(Player::value).collect();
        Ok(LineupGenerator {
            players: eligible,
            values,
            settings,
            rng,
            seen: HashSet::new(),
            lineups: Vec::new(),
            attempts: 0,
        })
    }

    pub fn generated(&self) -> usize {
        self.lineups.len()
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Draw one candidate lineup. `None` if it falls outside the salary window.
    pub fn draw(&mut self) -> Option<Lineup> {
        let picks = weighted_sample_without_replacement(&mut self.rng, &self.values, LINEUP_SIZE);
        if picks.len() < LINEUP_SIZE {
            return None;
        }

        let projections: Vec<f64> = picks
            .iter()
            .map(|&i| self.players[i].flex_projection())
            .collect();
        let captain_pos = weighted_pick(&mut self.rng, &projections).unwrap_or(0);

        let captain = &self.players[picks[captain_pos]];
        let flex: Vec<&Player> = picks
            .iter()
            .enumerate()
            .filter(|(pos, _)| *pos != captain_pos)
            .map(|(_, &i)| &self.players[i])
            .collect();

        let lineup = Lineup::new(captain, &flex).ok()?;
        if lineup.total_salary < self.settings.salary_min
            || lineup.total_salary > self.settings.salary_max
        {
            return None;
        }
        Some(lineup)
    }

    /// Run one attempt and keep the lineup if it is new. Returns whether a
    /// lineup was added.
    pub fn attempt(&mut self) -> bool {
        self.attempts += 1;
        let Some(lineup) = self.draw() else {
            return false;
        };
        if !self.seen.insert(lineup.key()) {
            return false;
        }
        self.lineups.push(lineup);
        true
    }

    fn count_limit_reached(&self) -> Option<StopReason> {
        match self.settings.termination {
            Termination::Count(target) => {
                if self.lineups.len() >= target {
                    Some(StopReason::TargetReached)
                } else if self.attempts >= (target as u64).saturating_mul(ATTEMPTS_PER_TARGET) {
                    Some(StopReason::Exhausted)
                } else {
                    None
                }
            }
            Termination::Duration(_) => None,
        }
    }

    fn progress(&self, start: Instant) -> GenerationProgress {
        let elapsed = start.elapsed();
        let secs = elapsed.as_secs_f64();
        GenerationProgress {
            generated: self.lineups.len(),
            attempts: self.attempts,
            elapsed,
            termination: self.settings.termination,
            rate: if secs > 0.0 {
                self.lineups.len() as f64 / secs
            } else {
                0.0
            },
        }
    }

    /// Generate until the termination policy or `cancel` stops it.
    ///
    /// The accumulated result is always returned, including after
    /// cancellation or pool exhaustion.
    pub async fn run<F>(mut self, cancel: &CancellationToken, mut on_progress: F) -> GenerationReport
    where
        F: FnMut(&GenerationProgress),
    {
        let start = Instant::now();
        let mut last_report = start;
        info!(
            players = self.players.len(),
            termination = ?self.settings.termination,
            "starting lineup generation"
        );

        let stop_reason = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }
            if let Some(reason) = self.count_limit_reached() {
                break reason;
            }
            if let Termination::Duration(budget) = self.settings.termination {
                if start.elapsed() >= budget {
                    break StopReason::TimeElapsed;
                }
            }

            for _ in 0..self.settings.batch_size {
                if self.count_limit_reached().is_some() {
                    break;
                }
                self.attempt();
            }

            if last_report.elapsed() >= self.settings.progress_interval {
                let progress = self.progress(start);
                debug!(
                    generated = progress.generated,
                    attempts = progress.attempts,
                    rate = progress.rate,
                    "generation progress"
                );
                on_progress(&progress);
                last_report = Instant::now();
            }

            tokio::task::yield_now().await;
        };

        on_progress(&self.progress(start));

        let elapsed = start.elapsed();
        info!(
            generated = self.lineups.len(),
            attempts = self.attempts,
            stop_reason = ?stop_reason,
            elapsed_ms = elapsed.as_millis() as u64,
            "lineup generation finished"
        );

        let mut lineups = self.lineups;
        sort_by_projection(&mut lineups);

        GenerationReport {
            lineups,
            attempts: self.attempts,
            stop_reason,
            elapsed,
        }
    }
}

/// Filter `pool` by the projection floor and generate lineups from it.
pub async fn generate<R, F>(
    pool: &[Player],
    settings: &GenerationSettings,
    rng: R,
    cancel: &CancellationToken,
    on_progress: F,
) -> Result<GenerationReport, EngineError>
where
    R: Rng,
    F: FnMut(&GenerationProgress),
{
    let eligible = eligible_players(pool, settings.projection_floor_percent);
    debug!(
        pool = pool.len(),
        eligible = eligible.len(),
        "applied projection floor"
    );
    let generator = LineupGenerator::new(eligible, settings.clone(), rng)?;
    Ok(generator.run(cancel, on_progress).await)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
