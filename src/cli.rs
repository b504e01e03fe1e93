//! # Command-Line Interface Module
//!
//! Clap derive definitions for `mpdc`. There are no subcommands: the
//! selection mode is picked by which of `-a`, `-g` or `-G` is given, and the
//! remaining flags tune limits, insertion and connections.
//!
//! Every tuning flag is optional here so [`crate::config`] can tell "not
//! given" apart from a value and layer flags over the config file.
//!
//! ## Examples
//!
//! ```bash
//! mpdc -a '^blur$'                 # top tracks, replace the queue
//! mpdc -a '^blur$' -r -l 40 -e     # 40 related tracks, appended
//! mpdc -g 'trip.?hop' -d           # genre mix, print only
//! mpdc -G rock                     # list matching genre tags
//! ```

use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
#[derive(Parser, Debug, Default)]
#[command(name = "mpdc")]
#[command(about = "mpdc: build MPD playlists from your MusicCabinet library")]
#[command(version)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["artist", "genres", "list_genres", "completions"])
))]
pub struct Args {
    /// Base the playlist on artists whose name matches <REGEX>
    #[arg(short, long, value_name = "REGEX", help_heading = "Selection")]
    pub artist: Option<String>,

    /// Select the artist's top ranked tracks (default for -a)
    #[arg(short, long, requires = "artist", conflicts_with = "related", help_heading = "Selection")]
    pub top_tracks: bool,

    /// Select tracks from artists related to the artist (implies -S)
    #[arg(short, long, requires = "artist", help_heading = "Selection")]
    pub related: bool,

    /// Base the playlist on genre tags matching <REGEX> (implies -S)
    #[arg(short, long, value_name = "REGEX", help_heading = "Selection")]
    pub genres: Option<String>,

    /// List the genre tags matching <REGEX> and exit
    #[arg(short = 'G', long, value_name = "REGEX", help_heading = "Selection")]
    pub list_genres: Option<String>,

    /// Maximum number of tracks to add [default: 25]
    #[arg(short = 'l', long, value_name = "N", help_heading = "Limits")]
    pub track_limit: Option<usize>,

    /// Maximum number of tracks per artist, not used by -t [default: 5]
    #[arg(short = 'L', long, value_name = "N", help_heading = "Limits")]
    pub artists_limit: Option<usize>,

    /// Append to the MPD playlist instead of replacing it
    #[arg(short, long, help_heading = "Playlist")]
    pub end: bool,

    /// Shuffle the MPD playlist after inserting
    #[arg(short, long, help_heading = "Playlist")]
    pub shuffle: bool,

    /// Shuffle the selected tracks before inserting
    #[arg(short = 'S', long, help_heading = "Playlist")]
    pub shuffle_tracks: bool,

    /// Only print the tracks, don't add or play them
    #[arg(short, long, help_heading = "Playlist")]
    pub dry: bool,

    /// Print dry-run and genre listings as JSON
    #[arg(long, help_heading = "Playlist")]
    pub json: bool,

    /// MPD's local music directory, stripped from library paths
    #[arg(long, value_name = "DIR", value_hint = clap::ValueHint::DirPath, help_heading = "Connections")]
    pub music_dir: Option<PathBuf>,

    /// MusicCabinet SQLite database
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath, help_heading = "Connections")]
    pub db: Option<PathBuf>,

    /// MPD host [default: localhost]
    #[arg(long, env = "MPD_HOST", value_name = "HOST", help_heading = "Connections")]
    pub mpd_host: Option<String>,

    /// MPD port [default: 6600]
    #[arg(long, env = "MPD_PORT", value_name = "PORT", help_heading = "Connections")]
    pub mpd_port: Option<u16>,

    /// MPD password
    #[arg(long, env = "MPD_PASSWORD", hide_env_values = true, value_name = "PASSWORD", help_heading = "Connections")]
    pub mpd_password: Option<String>,

    /// Config file [default: ~/.mpdcrc]
    #[arg(short, long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Seed the random selection for reproducible playlists
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Explain what is being done
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a completion script for <SHELL> and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<Shell>,
}
