use std::{path::PathBuf, process, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scroll_feeder::{
    axis::{movement_parameters::MoveParams, Axis},
    config::AppConfig,
    coordinator::{
        config::{CoordinatorConfig, Mode},
        Coordinator,
    },
    geometry::MotionProfile,
    motor_controller::NanotecController,
    runner::MotionRunner,
    sim::simulated_pair,
    socket_server::SocketServer,
    wait,
};

/// Drive the feed and take-up motors of the scroll installation.
#[derive(Parser, Debug)]
#[command(name = "scroll-feeder")]
#[command(version)]
struct Args {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run against simulated axes instead of the motor controllers.
    #[arg(long)]
    sim: bool,

    /// Override the configured mode (continuous, ticked, repeat).
    #[arg(long)]
    mode: Option<Mode>,

    /// Delay the start: MM:DD:YY:HH:MM:SS, HH:MM:SS or seconds.
    #[arg(long, value_name = "WHEN")]
    start_at: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn setup_tracing(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    if let Err(e) = run(args).await {
        error!("FATAL: {:#}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let profile = MotionProfile::from_config(&config);
    info!(
        "feed ticks: {:.1}   take ticks: {:.1}",
        profile.feed_steps(profile.move_length),
        profile.take_steps(profile.move_length)
    );
    info!(
        "feed velocity: {:.2}   take velocity: {:.2}",
        profile.feed_velocity, profile.take_velocity
    );

    let (feed, take): (Arc<dyn Axis>, Arc<dyn Axis>) = if args.sim {
        info!("Using simulated axes");
        let (feed, take) = simulated_pair(&config);
        (feed as Arc<dyn Axis>, take as Arc<dyn Axis>)
    } else {
        let feed = NanotecController::new("feed", &config.feed.address, &config.driver)?;
        let take = NanotecController::new("take", &config.take.address, &config.driver)?;
        (Arc::new(feed) as Arc<dyn Axis>, Arc::new(take) as Arc<dyn Axis>)
    };

    let coordinator = Coordinator::new(
        config.mode,
        profile,
        MoveParams::new(config.repeat.velocity, config.repeat.steps),
    );
    let coordinator_config = CoordinatorConfig {
        tick_interval: Duration::from_millis(config.tick_interval_ms),
    };
    let (mut runner, control) = MotionRunner::new(coordinator, coordinator_config, feed, take);

    let socket_server = match config.control_socket.clone() {
        Some(socket_config) => {
            let mut server = SocketServer::new(socket_config, control);
            server.start().await?;
            Some(server)
        }
        None => None,
    };

    if let Some(when) = &args.start_at {
        wait::wait_until(when).await;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt");
            let _ = shutdown_tx.send(());
        }
    });

    let result = runner.run(shutdown_rx).await;

    if let Some(server) = &socket_server {
        server.shutdown().await?;
    }
    result?;

    info!("Shutdown complete");
    Ok(())
}
