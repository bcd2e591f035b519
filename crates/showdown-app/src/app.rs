// End-to-end pipeline: load the slate, generate lineups, assign entries,
// write outputs. `main` wires this to config, signals and the terminal.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use showdown_core::analysis::{candidate_pool, PoolAnalysis};
use showdown_core::generator::{GenerationProgress, StopReason};
use showdown_core::session::Session;

use crate::config::Config;
use crate::export::{self, RunSummary};
use crate::import;

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub written: Vec<PathBuf>,
}

/// Run the full pipeline with data paths resolved against `base_dir`.
///
/// Cancelling `cancel` stops generation early; whatever lineups exist by
/// then are still assigned and exported.
pub async fn run<F>(
    config: &Config,
    base_dir: &Path,
    cancel: &CancellationToken,
    on_progress: F,
) -> anyhow::Result<RunOutcome>
where
    F: FnMut(&GenerationProgress),
{
    let players_path = base_dir.join(&config.data_paths.players);
    let players = import::load_players(&players_path).context("failed to load player pool")?;
    info!("Loaded {} players from {}", players.len(), players_path.display());

    let mut session = Session::new(players);

    let rng = match config.generation.seed {
        Some(seed) => {
            info!("Using fixed seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    session
        .generate(&config.generation.to_settings(), rng, cancel, on_progress)
        .await
        .context("lineup generation failed")?;

    let generation = session
        .last_generation()
        .context("generation produced no report")?;
    if generation.stop_reason == StopReason::Cancelled {
        warn!(
            "Generation cancelled; continuing with {} lineups",
            generation.lineups.len()
        );
    }

    let entries_path = base_dir.join(&config.data_paths.entries);
    let entries = import::load_entries(&entries_path, &config.contests.classifier())
        .context("failed to load contest entries")?;
    info!("Loaded {} entries from {}", entries.len(), entries_path.display());

    let assignment = session
        .assign(entries, &config.assignment.to_settings())
        .context("entry assignment failed")?;

    let candidates = candidate_pool(&generation.lineups, config.assignment.candidate_pool_size);
    let analysis = PoolAnalysis::from_lineups(&candidates);
    let summary = RunSummary::new(
        generation,
        &assignment,
        &analysis,
        config.assignment.exposure_top_n,
    );

    let written = export::write_outputs(
        &base_dir.join(&config.data_paths.output_dir),
        session.players(),
        generation,
        &assignment,
        &summary,
    )
    .context("failed to write outputs")?;

    Ok(RunOutcome { summary, written })
}
