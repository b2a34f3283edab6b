//! Binary entrypoint for the macrokey runner.
//!
//! Loads a macro store, binds every enabled macro to its hotkey, and
//! polls until interrupted. `check` validates a store without running
//! anything.

use std::{path::PathBuf, process};

use clap::{Parser, Subcommand};
use macrokey_engine::{Engine, MacroStore, parse_action};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "macrokey", about = "Hotkey-triggered macro runner", version)]
/// Command-line interface for the `macrokey` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to the macro store
    #[arg(long, value_name = "PATH", default_value = "macros.json")]
    store: PathBuf,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the macro store then exit.
    Check {
        /// Path to the store to check (defaults to --store)
        path: Option<PathBuf>,
    },
}

/// Validate every macro in `store`, printing one line per problem.
///
/// Problems are hotkeys that do not resolve and action lines that do
/// not parse. Returns the number of problems found.
fn check_store(store: &MacroStore) -> usize {
    let mut problems = 0;
    let mut bad = |msg: String| {
        println!("{msg}");
        problems += 1;
    };

    for mac in &store.basic {
        if keycode::resolve(&mac.hotkey).is_none() {
            bad(format!("basic {:?}: unknown hotkey {:?}", mac.name, mac.hotkey));
        }
        for action in &mac.actions {
            if parse_action(action).is_none() {
                bad(format!("basic {:?}: action does not parse: {:?}", mac.name, action));
            }
        }
    }
    for mac in &store.combo {
        if keycode::resolve(&mac.hotkey).is_none() {
            bad(format!("combo {:?}: unknown hotkey {:?}", mac.name, mac.hotkey));
        }
        for skill in &mac.skills {
            if parse_action(skill).is_none() {
                bad(format!("combo {:?}: skill does not parse: {:?}", mac.name, skill));
            }
        }
    }
    for mac in &store.image {
        if parse_action(&mac.action).is_none() {
            bad(format!("image {:?}: action does not parse: {:?}", mac.name, mac.action));
        }
    }
    problems
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let env_filter = logging::env_filter_from_spec(&cli.log.spec());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().without_time())
        .try_init()
        .ok();

    if let Some(Command::Check { path }) = &cli.command {
        let path = path.as_deref().unwrap_or(&cli.store);
        let store = match MacroStore::load(path) {
            Ok(store) => store,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                process::exit(1);
            }
        };
        let problems = check_store(&store);
        if problems == 0 {
            println!("OK");
            return;
        }
        process::exit(1);
    }

    let store = MacroStore::load_or_default(&cli.store);
    if store.is_empty() {
        info!(path = %cli.store.display(), "no macros defined");
    }

    let engine = Engine::new();
    let bound = engine.start_monitoring(&store);
    info!(bound, "monitoring; press Ctrl-C to exit");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "signal handler failed");
    }
    engine.shutdown().await;
}
