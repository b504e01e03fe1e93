//! # mpdc - MPD playlists from a MusicCabinet library
//!
//! Picks tracks by artist popularity, artist relations or genre tags and
//! hands them to MPD.
//!
//! ## Usage
//!
//! ```bash
//! # Top tracks of an artist, replacing the current playlist
//! mpdc -a '^radiohead$'
//!
//! # Related artists, appended and shuffled by MPD
//! mpdc -a '^radiohead$' -r -e -s
//!
//! # Genre mix, printed only
//! mpdc -g 'shoegaze|dream pop' -d
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, LevelFilter};
use mpdc::cli::Args;
use mpdc::config::Settings;
use mpdc::db::SqliteStore;
use mpdc::mpd_client::MpdClient;
use mpdc::resolver::StdinChooser;
use mpdc::{completion, pipeline};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;

/// Main entry point for mpdc.
///
/// # Error Handling
///
/// Errors are returned to the runtime, which prints the context chain and
/// exits with status 1.
///
/// # Logging
///
/// Warnings only by default, `-v` adds progress. `RUST_LOG` overrides both:
/// - `RUST_LOG=debug mpdc -a blur` - SQL pool sizes and MPD commands
/// - `RUST_LOG=mpdc::algorithm=trace mpdc -g rock` - Module-specific logging
fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        completion::write_completions(shell, &mut io::stdout());
        return Ok(());
    }

    init_logging(args.verbose);
    let settings = Settings::load(&args)?;
    // `verbose = true` in the config file counts as -v.
    set_verbose(settings.verbose);
    install_interrupt_handler()?;

    let store = SqliteStore::open(&settings.db_path)?;
    let mut rng = match settings.seed {
        Some(seed) => {
            info!("Using random seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let outcome = pipeline::run(
        &settings,
        &store,
        &mut StdinChooser,
        |mpd| MpdClient::connect(&mpd.host, mpd.port),
        &mut rng,
        &mut io::stdout(),
    )?;
    debug!("{outcome:?}");

    Ok(())
}

fn init_logging(verbose: bool) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("mpdc=info"))
        .format_timestamp(None)
        .init();
    set_verbose(verbose);
}

fn set_verbose(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(if verbose { LevelFilter::Info } else { LevelFilter::Warn });
    }
}

/// Exits with status 130 on Ctrl-C without touching MPD.
fn install_interrupt_handler() -> Result<()> {
    ctrlc::set_handler(|| {
        println!("\ngot INT signal, quitting");
        std::process::exit(130);
    })
    .context("Failed to install Ctrl-C handler")
}
