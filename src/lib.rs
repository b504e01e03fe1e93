//! Playlist builder for MPD driven by a MusicCabinet library.
//!
//! Core modules:
//! - [`resolver`] - Artist pattern resolution and disambiguation
//! - [`ranking`] - The three selection strategies
//! - [`algorithm`] - Weighted-random scoring and two-stage sampling
//! - [`playlist`] - Final ordering and path mapping
//! - [`pipeline`] - One run from settings to a filled MPD playlist
//!
//! ### Supporting Modules
//!
//! - [`db`] - Metadata store trait and SQLite implementation
//! - [`mpd_client`] - Playback sink trait and MPD protocol client
//! - [`config`] - Layered settings (defaults, `~/.mpdcrc`, flags)
//! - [`cli`] - Command-line interface definitions with clap integration
//! - [`completion`] - Shell completion generation
//! - [`path_translator`] - Library path to MPD path conversion
//! - [`mpd_config`] - MPD `music_directory` lookup
//! - [`error`] - Selection errors reported to the user
//! - [`track`] - Artists, candidates and playlist entries
//!
//! ## Quick Start Example
//!
//! ```no_run
//! use mpdc::db::SqliteStore;
//! use mpdc::ranking::{QueueConfig, RankingEngine};
//! use mpdc::resolver::{ArtistResolver, StdinChooser};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//! use std::path::Path;
//!
//! let store = SqliteStore::open(Path::new("musiccabinet.db"))?;
//! let mut chooser = StdinChooser;
//! let artists = ArtistResolver::new(&store, &mut chooser).top_tracks("^blur$")?;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut engine = RankingEngine::new(&store, &mut rng, QueueConfig::default());
//! for track in engine.top_tracks(&artists)? {
//!     println!("{}", track.label());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Selection Strategies
//!
//! ### Top Tracks
//! The most played tracks of one artist, or of every artist matching the
//! pattern when the user asks for all of them. Deterministic.
//!
//! ### Related Artists
//! Tracks of the artists related to a seed artist, the seed included. Each
//! artist's tracks are first ranked by a random blend of popularity and play
//! count and capped, then the survivors are sampled by a random score favoring
//! strongly related artists.
//!
//! ### Genres
//! Same two stages over the artists carrying the matched tags, with the
//! artist's summed tag count as its weight.

pub mod algorithm;
pub mod cli;
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod mpd_client;
pub mod mpd_config;
pub mod path_translator;
pub mod pipeline;
pub mod playlist;
pub mod ranking;
pub mod resolver;
pub mod track;
