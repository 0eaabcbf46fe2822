use anyhow::Result;
use lvr_land::{extract, pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    let config = Config::from_env()?;
    info!(?config, "startup");

    // ─── 2) stage the five CSVs from the season archive ──────────────
    if config.archive.is_file() {
        extract::stage_sources(&config.archive, &config.unzip_dir)?;
    } else {
        info!(
            archive = %config.archive.display(),
            "no archive, using CSVs already in {}",
            config.unzip_dir.display()
        );
    }

    // ─── 3) normalize, filter, aggregate, write shards ───────────────
    let summary = pipeline::run(&config)?;
    info!(
        rows = summary.rows,
        admitted = summary.admitted,
        cities = summary.cities,
        shards = summary.shards.len(),
        "Process completed!"
    );
    Ok(())
}
