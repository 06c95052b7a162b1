use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use monibot_core::{Api, CancellationToken, HttpSender};
use serde_json::to_string as to_json;
use tracing::{error, info, Level};

mod config;
mod sampler;

use config::ConnectionArgs;
use sampler::Sampler;

#[derive(Parser)]
#[command(name = "moni")]
#[command(about = "Command line client for the Monibot monitoring service", long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Log requests, responses and retries to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective connection settings
    Config,

    /// Show the client version
    Version,

    /// Check that the service is reachable and the API key is valid
    Ping,

    /// List watchdogs
    Watchdogs,

    /// Show one watchdog
    Watchdog { id: String },

    /// Send a watchdog heartbeat
    Heartbeat {
        id: String,

        /// Keep sending, every INTERVAL seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// List machines
    Machines,

    /// Show one machine
    Machine { id: String },

    /// Collect and send a machine sample
    Sample {
        id: String,

        /// Keep sampling, every INTERVAL seconds
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Send a text file (or `-` for stdin) for a machine
    Text { id: String, file: PathBuf },

    /// List metrics
    Metrics,

    /// Show one metric
    Metric { id: String },

    /// Increment a counter metric
    Inc {
        id: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Set a gauge metric
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        value: i64,
    },

    /// Send histogram values, comma separated
    Values {
        id: String,
        #[arg(value_delimiter = ',', allow_negative_numbers = true, required = true)]
        values: Vec<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Config => {
            println!("{}", cli.connection.describe());
            return Ok(());
        }
        Commands::Version => {
            println!("moni {}", monibot_core::VERSION);
            return Ok(());
        }
        _ => {}
    }

    let api = Api::from_config(cli.connection.sender_config()?);
    run(&api, &CancellationToken::new(), cli.command)
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(api: &Api<HttpSender>, ctx: &CancellationToken, command: Commands) -> Result<()> {
    match command {
        Commands::Config | Commands::Version => {}
        Commands::Ping => {
            api.get_ping(ctx).context("ping failed")?;
            println!("ok");
        }
        Commands::Watchdogs => {
            for watchdog in api.get_watchdogs(ctx).context("cannot list watchdogs")? {
                println!("{}", to_json(&watchdog)?);
            }
        }
        Commands::Watchdog { id } => {
            let watchdog = api
                .get_watchdog(ctx, &id)
                .with_context(|| format!("cannot get watchdog {id}"))?;
            println!("{}", to_json(&watchdog)?);
        }
        Commands::Heartbeat { id, interval } => {
            repeat(interval, || {
                api.post_watchdog_heartbeat(ctx, &id)
                    .with_context(|| format!("cannot send heartbeat for watchdog {id}"))?;
                info!(%id, "heartbeat sent");
                Ok(())
            })?;
        }
        Commands::Machines => {
            for machine in api.get_machines(ctx).context("cannot list machines")? {
                println!("{}", to_json(&machine)?);
            }
        }
        Commands::Machine { id } => {
            let machine = api
                .get_machine(ctx, &id)
                .with_context(|| format!("cannot get machine {id}"))?;
            println!("{}", to_json(&machine)?);
        }
        Commands::Sample { id, interval } => {
            let mut sampler = Sampler::new();
            // CPU usage and counter deltas need two readings some time apart.
            let period = Duration::from_secs(interval.unwrap_or(1).max(1));
            thread::sleep(period.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL));
            repeat(interval, || {
                let sample = sampler.sample();
                api.post_machine_sample(ctx, &id, &sample)
                    .with_context(|| format!("cannot send sample for machine {id}"))?;
                info!(%id, tstamp = sample.tstamp, "sample sent");
                Ok(())
            })?;
        }
        Commands::Text { id, file } => {
            let text = read_text(&file)?;
            api.post_machine_text(ctx, &id, &text)
                .with_context(|| format!("cannot send text for machine {id}"))?;
        }
        Commands::Metrics => {
            for metric in api.get_metrics(ctx).context("cannot list metrics")? {
                println!("{}", to_json(&metric)?);
            }
        }
        Commands::Metric { id } => {
            let metric = api
                .get_metric(ctx, &id)
                .with_context(|| format!("cannot get metric {id}"))?;
            println!("{}", to_json(&metric)?);
        }
        Commands::Inc { id, value } => {
            api.post_metric_inc(ctx, &id, value)
                .with_context(|| format!("cannot increment metric {id}"))?;
        }
        Commands::Set { id, value } => {
            api.post_metric_set(ctx, &id, value)
                .with_context(|| format!("cannot set metric {id}"))?;
        }
        Commands::Values { id, values } => {
            api.post_metric_values(ctx, &id, &values)
                .with_context(|| format!("cannot send values for metric {id}"))?;
        }
    }
    Ok(())
}

/// Run `action` once, or forever every `interval` seconds. In the repeating
/// case a failed round is logged and the next round still runs.
fn repeat(interval: Option<u64>, mut action: impl FnMut() -> Result<()>) -> Result<()> {
    let Some(secs) = interval else {
        return action();
    };
    let period = Duration::from_secs(secs.max(1));
    loop {
        if let Err(err) = action() {
            error!("{err:#}");
        }
        thread::sleep(period);
    }
}

fn read_text(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("cannot read {}", file.display()))
}
