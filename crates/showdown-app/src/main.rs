// Showdown optimizer entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file; stdout carries the run summary)
// 2. Load config
// 3. Arm Ctrl+C to cancel generation
// 4. Run the pipeline
// 5. Print the summary

use std::io::Write;
use std::time::Instant;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use showdown_app::app;
use showdown_app::config;
use showdown_app::export::RunSummary;
use showdown_core::generator::{GenerationProgress, Termination};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Showdown optimizer starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: salary window {}..={}, {:?} assignment",
        config.generation.salary_min, config.generation.salary_max, config.assignment.mode
    );

    // 3. Ctrl+C stops generation; the run finishes with what it has.
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping generation");
            interrupt.cancel();
        }
    });

    // 4. Run
    let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
    let started = Instant::now();
    let outcome = app::run(&config, &base_dir, &cancel, print_progress).await?;
    eprintln!();

    // 5. Summary
    print_summary(&outcome.summary);
    for path in &outcome.written {
        println!("  wrote {}", path.display());
    }

    info!("Run finished in {:.1}s", started.elapsed().as_secs_f64());
    Ok(())
}

fn print_progress(p: &GenerationProgress) {
    let target = match p.termination {
        Termination::Count(n) => format!("{}/{}", p.generated, n),
        Termination::Duration(d) => {
            format!("{} ({:.0}s/{:.0}s)", p.generated, p.elapsed.as_secs_f64(), d.as_secs_f64())
        }
    };
    eprint!("\rGenerating lineups: {} at {:.0}/s   ", target, p.rate);
    let _ = std::io::stderr().flush();
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Generated {} unique lineups in {:.1}s ({} attempts, {:?})",
        summary.lineups_generated, summary.elapsed_seconds, summary.attempts, summary.stop_reason
    );
    println!(
        "Assigned {} entries: {} cash, {} tournament, {} distinct lineups",
        summary.entries,
        summary.cash_entries,
        summary.tournament_entries,
        summary.distinct_lineups_used
    );

    if !summary.exposure.is_empty() {
        println!("Exposure across ${:.2} in tournaments:", summary.total_gpp_dollars);
        for row in &summary.exposure {
            println!("  {:<28} ${:>9.2}  {:>5.1}%", row.player, row.dollars, row.percent);
        }
    }
    if !summary.chalk_captains.is_empty() {
        println!("Most common captains in the candidate pool:");
        for row in &summary.chalk_captains {
            println!("  {:<28} {}", row.name, row.count);
        }
    }
}

/// Initialize tracing to log to a file so the terminal stays readable.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("showdown.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("showdown_app=info,showdown_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
