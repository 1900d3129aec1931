use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use flashviz::config::AppSettings;
use flashviz::core::{normalize, MalformedPolicy, StartTimeFormat};
use flashviz::input::{DataProvider, FileProvider};
use flashviz::playback::{PlaybackController, PlaybackSession};
use flashviz::sync::{MemorySynchronizer, ProjectionMode};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Projection {
    #[value(name = "2d")]
    Flat,
    #[value(name = "3d")]
    Globe,
}

/// Replay lightning flashes on a map and a time-series chart
#[derive(Parser, Debug)]
#[command(name = "flashviz", version, about)]
struct Cli {
    /// Flash data file (CSV or JSON)
    file: PathBuf,

    /// How long to play before stopping, in milliseconds
    #[arg(long, default_value_t = 2000)]
    duration_ms: u64,

    /// Milliseconds between ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Day covered by the data (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Start times are TAI93 seconds instead of text
    #[arg(long)]
    tai93: bool,

    /// Reject the whole file on the first malformed record
    #[arg(long)]
    strict: bool,

    #[arg(long, value_enum)]
    projection: Option<Projection>,

    /// Show the daily cloud imagery overlay
    #[arg(long)]
    clouds: bool,

    /// Show the overview instead of playing
    #[arg(long)]
    no_autoplay: bool,

    /// Persist the effective settings
    #[arg(long)]
    save_settings: bool,

    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, settings: &mut AppSettings) {
        if let Some(ms) = self.tick_ms {
            settings.tick_interval_ms = ms;
        }
        if let Some(date) = self.date {
            settings.date = date;
        }
        if self.tai93 {
            settings.time_format = StartTimeFormat::Tai93;
        }
        if self.strict {
            settings.malformed_policy = MalformedPolicy::Strict;
        }
        if let Some(projection) = self.projection {
            settings.projection = match projection {
                Projection::Flat => ProjectionMode::Scene2D,
                Projection::Globe => ProjectionMode::Scene3D,
            };
        }
        if self.clouds {
            settings.show_clouds = true;
        }
        if self.no_autoplay {
            settings.autoplay = false;
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "flashviz=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(cli: &Cli, settings: AppSettings) -> Result<()> {
    let provider = FileProvider::new(&cli.file);
    let records = provider.fetch().await?;
    let sequence = normalize(&records, settings.normalize_options())
        .with_context(|| format!("Rejected flash data from {}", provider.source_name()))?;
    let sequence = Arc::new(sequence);

    if let Some((first, last)) = sequence.time_range() {
        info!("Flashes span {} .. {}", first, last);
    }

    let mut views = MemorySynchronizer::in_memory();
    views.prepare(&sequence, settings.date);

    let session = PlaybackSession::new(sequence.clone(), views);
    let mut controller = PlaybackController::new(session, settings.playback_config());

    controller
        .enable_projection_toggle(settings.projection == ProjectionMode::Scene3D)
        .await;
    controller.enable_cloud_layer_toggle(settings.show_clouds).await;

    if settings.autoplay {
        controller.enable_animation_toggle(true).await;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(cli.duration_ms)) => {}
            _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        }

        let (cursor, loops) = controller
            .with_session(|s| (s.engine.cursor(), s.engine.loops()))
            .await;
        info!("Stopping at cursor {:?} after {} full loop(s)", cursor, loops);
        controller.enable_animation_toggle(false).await;
    } else {
        controller.with_session(|s| s.show_overview()).await;
    }

    let (points, layers) = controller
        .with_session(|s| (s.views.map().point_count(), s.views.map().layers().count()))
        .await;
    println!(
        "{} flashes, {} distinct timestamps, {} points on the map, {} imagery layer(s)",
        sequence.len(),
        sequence.group_count(),
        points,
        layers
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let mut settings = AppSettings::load();
    cli.apply(&mut settings);
    if cli.save_settings {
        settings.save();
    }

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run(&cli, settings))
}
