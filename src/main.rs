use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use netclock::config::Config;
use netclock::interpreter::Interpreter;
use netclock::network::{connection, http};
use netclock::observability::metrics::init_metrics;
use netclock::system::{
    ClockSink, LogClockSink, ScriptTimeSetter, SystemTimeSource, TimeSetter, TimeSource,
};

/// NetClock server
#[derive(Parser, Debug)]
#[command(name = "netclock")]
#[command(about = "Network clock server with a terminal command protocol", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(false)
        .compact()
        .init();

    if config.metrics.enabled {
        init_metrics(&config.metrics.listen_address);
        info!("Metrics exporter listening on {}", config.metrics.listen_address);
    }

    let collaborator_timeout = Duration::from_secs(config.time.collaborator_timeout_secs);
    let clock_sink: Arc<dyn ClockSink> = Arc::new(LogClockSink::new());
    let time_source: Arc<dyn TimeSource> = Arc::new(SystemTimeSource);
    let time_setter: Option<Arc<dyn TimeSetter>> = config
        .time
        .set_time_script
        .as_ref()
        .map(|script| {
            Arc::new(ScriptTimeSetter::new(script, config.time.run_as_user.clone()))
                as Arc<dyn TimeSetter>
        });
    if time_setter.is_none() {
        info!("No set-time script configured; system time will not be changed");
    }

    let interpreter = Arc::new(Interpreter::new(
        clock_sink,
        Arc::clone(&time_source),
        time_setter.clone(),
        collaborator_timeout,
    ));

    let api_state = http::ApiState {
        interpreter: Arc::clone(&interpreter),
        time_source,
        time_setter,
        collaborator_timeout,
    };
    let http_address = config.http_address();
    tokio::spawn(async move {
        if let Err(e) = http::serve(&http_address, api_state).await {
            error!("HTTP server failed: {}", e);
        }
    });

    let tcp_address = config.tcp_address();
    let listener = match TcpListener::bind(&tcp_address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", tcp_address, e);
            std::process::exit(1);
        }
    };
    info!("NetClock TCP server listening on {}", tcp_address);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let interpreter = Arc::clone(&interpreter);
                // One task per client connection, each owning its session
                tokio::spawn(async move {
                    connection::handle_client(stream, interpreter).await;
                    info!("Client disconnected");
                });
            }
            Err(e) => error!("Connection failed: {}", e),
        }
    }
}
