//! lm-relay e2e test runner
//!
//! Default (no args): finds the relay binary, spawns it, runs all tests, kills it.
//!
//!   cargo run                          # auto-detect relay binary, run all tests
//!   cargo run -- list                  # list all tests
//!   cargo run -- run                   # connect to an already-running relay
//!   cargo run -- spawn-and-run [opts]  # explicit paths / ports

mod backend;
mod client;
mod runner;
mod tests;
mod types;

use clap::{Parser, Subcommand};
use colored::Colorize;
use runner::{list_tests, run_tests, TestContext};
use tests::all_tests;

/// Relay binary candidates, tried in order
const DEFAULT_RELAY_BINS: &[&str] = &["../target/release/lm-relay", "../target/debug/lm-relay"];

const DEFAULT_RELAY_CONFIG: &str = "test_configs/relay.yaml";
const DEFAULT_BACKEND_PORT: u16 = 18234;
const DEFAULT_RELAY_PORT: u16 = 18300;

#[derive(Parser)]
#[command(
    name = "e2e",
    about = "End-to-end tests for lm-relay",
    long_about = "Runs all e2e tests by default (no arguments needed).\n\
                  Spawns the relay binary against a mock LM Studio backend, runs tests, then kills it."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Only run tests whose name contains this string
    #[arg(long, short, global = true)]
    filter: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to an already-running relay and run tests
    Run {
        /// Address of the real relay
        #[arg(long, default_value = "127.0.0.1:18300")]
        relay_addr: String,

        /// Port for the mock backend - the relay's upstream URL must point here
        #[arg(long, default_value_t = DEFAULT_BACKEND_PORT)]
        backend_port: u16,
    },

    /// List all available tests
    List,

    /// Spawn the relay binary, run all tests, then kill it
    SpawnAndRun {
        /// Path to the lm-relay binary
        #[arg(long)]
        relay_bin: Option<String>,

        /// Relay config YAML (upstream URL must point at the mock backend port)
        #[arg(long, default_value = DEFAULT_RELAY_CONFIG)]
        relay_config: String,

        /// Port for the mock backend - must match config
        #[arg(long, default_value_t = DEFAULT_BACKEND_PORT)]
        backend_port: u16,

        /// Relay listen port - must match config
        #[arg(long, default_value_t = DEFAULT_RELAY_PORT)]
        relay_port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let relay_bin = find_relay_bin()?;
            spawn_and_run(
                relay_bin,
                DEFAULT_RELAY_CONFIG.to_string(),
                DEFAULT_BACKEND_PORT,
                DEFAULT_RELAY_PORT,
                cli.filter,
            )
            .await?;
        }

        Some(Command::List) => {
            list_tests(&all_tests());
        }

        Some(Command::Run {
            relay_addr,
            backend_port,
        }) => {
            println!("Starting mock LM Studio backend on port {}...", backend_port);
            let backend_state = backend::start(backend_port).await?;

            let ctx = TestContext {
                relay_addr,
                backend_state,
                http_client: client::build_client(),
            };

            let results = run_tests(all_tests(), ctx, cli.filter.as_deref()).await;
            exit_on_failure(&results);
        }

        Some(Command::SpawnAndRun {
            relay_bin,
            relay_config,
            backend_port,
            relay_port,
        }) => {
            let relay_bin = match relay_bin {
                Some(p) => p,
                None => find_relay_bin()?,
            };
            spawn_and_run(relay_bin, relay_config, backend_port, relay_port, cli.filter).await?;
        }
    }

    Ok(())
}

async fn spawn_and_run(
    relay_bin: String,
    relay_config: String,
    backend_port: u16,
    relay_port: u16,
    filter: Option<String>,
) -> anyhow::Result<()> {
    println!("Starting mock LM Studio backend on port {}...", backend_port);
    let backend_state = backend::start(backend_port).await?;

    println!("Spawning relay: {} run --config {}", relay_bin, relay_config);
    let mut relay_process = tokio::process::Command::new(&relay_bin)
        .arg("run")
        .arg("--config")
        .arg(&relay_config)
        // the config file decides the upstream, not the caller's shell
        .env_remove("LM_STUDIO_URL")
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| anyhow::anyhow!("Failed to spawn '{}': {}", relay_bin, e))?;

    let relay_addr = format!("127.0.0.1:{}", relay_port);
    println!("Waiting for relay at {}...", relay_addr);
    wait_for_relay(&relay_addr).await?;
    println!("Relay is ready!\n");

    let ctx = TestContext {
        relay_addr,
        backend_state,
        http_client: client::build_client(),
    };

    let results = run_tests(all_tests(), ctx, filter.as_deref()).await;

    relay_process.kill().await.ok();

    exit_on_failure(&results);
    Ok(())
}

fn find_relay_bin() -> anyhow::Result<String> {
    for candidate in DEFAULT_RELAY_BINS {
        if std::path::Path::new(candidate).exists() {
            println!("Using relay binary: {}", candidate.bright_cyan());
            return Ok(candidate.to_string());
        }
    }
    Err(anyhow::anyhow!(
        "No relay binary found. Tried: {}\nBuild with: cd .. && cargo build --release",
        DEFAULT_RELAY_BINS.join(", ")
    ))
}

fn exit_on_failure(results: &[crate::types::TestResult]) {
    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }
}

/// Poll /health until the relay accepts connections
async fn wait_for_relay(addr: &str) -> anyhow::Result<()> {
    let client = client::build_client();
    let health_url = format!("http://{}/health", addr);

    for attempt in 0..30 {
        tokio::time::sleep(tokio::time::Duration::from_millis(200 + attempt * 100)).await;
        if client.get(&health_url).send().await.is_ok() {
            return Ok(());
        }
    }

    Err(anyhow::anyhow!("Relay did not start within timeout. Is the binary correct? Check: {}", addr))
}
