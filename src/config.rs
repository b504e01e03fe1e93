//! # Configuration Module
//!
//! Builds the immutable [`Settings`] for one run from three layers, later
//! layers winning:
//!
//! 1. built-in defaults
//! 2. the config file (`~/.mpdcrc`, or `--config`)
//! 3. command-line flags
//!
//! ## Config File
//!
//! TOML with flat keys. Unknown keys are reported and ignored.
//!
//! ```toml
//! # ~/.mpdcrc
//! track_limit = 40
//! playlist_position = "end"
//! shuffle_mpd = true
//! music_dir = "~/Music/"
//! mpd_host = "jukebox.local"
//! ```
//!
//! ## Data Storage
//!
//! Without `db_path` or `--db` the library database is expected in the
//! platform data directory:
//! - Linux: `~/.local/share/mpdc/musiccabinet.db`
//! - macOS: `~/Library/Application Support/mpdc/musiccabinet.db`
//! - Windows: `%APPDATA%\mpdc\musiccabinet.db`

use crate::cli::Args;
use crate::mpd_client::MpdSettings;
use crate::path_translator;
use crate::ranking::QueueConfig;
use anyhow::{anyhow, bail, Context, Result};
use log::{info, warn};
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const DB_FILE_NAME: &str = "musiccabinet.db";

/// What the run selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    TopTracks { artist: String },
    Related { artist: String },
    Genres { pattern: String },
    ListGenres { pattern: String },
}

/// Where new tracks go in the MPD playlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistPosition {
    /// Clear the playlist first.
    #[default]
    Replace,
    /// Append to the current playlist.
    End,
}

/// Everything one run needs. Built once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub selection: Selection,
    pub queue: QueueConfig,
    pub position: PlaylistPosition,
    /// Shuffle the candidate list before inserting.
    pub shuffle_tracks: bool,
    /// Ask MPD to shuffle its playlist after inserting.
    pub shuffle_queue: bool,
    pub dry_run: bool,
    pub json: bool,
    /// Normalized music root (empty or ending with `/`).
    pub music_dir: String,
    pub db_path: PathBuf,
    pub mpd: MpdSettings,
    pub seed: Option<u64>,
    pub verbose: bool,
}

impl Settings {
    /// Loads the config file and resolves all layers against `args`.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file is missing, any config
    /// value is malformed, or no selection mode was given.
    pub fn load(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => FileConfig::load(&path)?,
                _ => FileConfig::default(),
            },
        };

        Self::resolve(args, file, crate::mpd_config::detect_music_directory)
    }

    /// Layers `args` over `file` over the defaults. `detect_music_dir` is only
    /// consulted when neither layer names a music directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no selection mode was given or a path cannot be
    /// made absolute.
    pub fn resolve<F>(args: &Args, file: FileConfig, detect_music_dir: F) -> Result<Self>
    where
        F: FnOnce() -> Option<PathBuf>,
    {
        let selection = selection_from(args)?;

        let queue = QueueConfig {
            track_limit: args
                .track_limit
                .or(file.track_limit)
                .unwrap_or(QueueConfig::default().track_limit),
            per_artist_limit: args
                .artists_limit
                .or(file.related_artists_limit)
                .unwrap_or(QueueConfig::default().per_artist_limit),
        };

        let position = if args.end {
            PlaylistPosition::End
        } else {
            file.playlist_position.unwrap_or_default()
        };

        // Related and genre playlists are always shuffled before inserting.
        let forced_shuffle = matches!(selection, Selection::Related { .. } | Selection::Genres { .. });
        let shuffle_tracks = forced_shuffle || args.shuffle_tracks || file.shuffle.unwrap_or(false);

        let music_dir = match args.music_dir.clone().or(file.music_dir) {
            Some(dir) => normalize_music_dir(&dir)?,
            None => match detect_music_dir() {
                Some(dir) => path_translator::normalize_root(&absolute(&dir)?.to_string_lossy()).0,
                None => {
                    info!("No music directory configured, library paths are used as-is");
                    String::new()
                }
            },
        };

        let db_path = match args.db.clone().or(file.db_path) {
            Some(path) => absolute(&path)?,
            None => default_db_path()?,
        };

        let defaults = MpdSettings::default();
        let mpd = MpdSettings {
            host: args.mpd_host.clone().or(file.mpd_host).unwrap_or(defaults.host),
            port: args.mpd_port.or(file.mpd_port).unwrap_or(defaults.port),
            password: args
                .mpd_password
                .clone()
                .or(file.mpd_password)
                .filter(|p| !p.is_empty()),
        };

        Ok(Self {
            selection,
            queue,
            position,
            shuffle_tracks,
            shuffle_queue: args.shuffle || file.shuffle_mpd.unwrap_or(false),
            dry_run: args.dry || file.dryrun.unwrap_or(false),
            json: args.json,
            music_dir,
            db_path,
            mpd,
            seed: args.seed,
            verbose: args.verbose || file.verbose.unwrap_or(false),
        })
    }
}

fn selection_from(args: &Args) -> Result<Selection> {
    if let Some(artist) = &args.artist {
        let artist = artist.clone();
        return Ok(if args.related {
            Selection::Related { artist }
        } else {
            Selection::TopTracks { artist }
        });
    }
    if let Some(pattern) = &args.genres {
        return Ok(Selection::Genres { pattern: pattern.clone() });
    }
    if let Some(pattern) = &args.list_genres {
        return Ok(Selection::ListGenres { pattern: pattern.clone() });
    }
    bail!("Nothing to select: give -a <artist>, -g <genres> or -G <genres>")
}

fn normalize_music_dir(dir: &Path) -> Result<String> {
    let given = dir.to_string_lossy();
    let (_, missing_slash) = path_translator::normalize_root(&given);
    // Absolutizing drops the trailing separator, so it is re-added afterwards.
    let (root, _) = path_translator::normalize_root(&absolute(dir)?.to_string_lossy());
    if missing_slash {
        warn!("Music directory should end with '/', using {root:?}");
    }
    Ok(root)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .with_context(|| format!("Failed to resolve path {}", path.display()))?
        .into_owned())
}

/// `~/.mpdcrc` in the user's home directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mpdcrc"))
}

/// Returns the platform-appropriate database file path.
///
/// Unlike a database that is created on demand, the library is produced by
/// MusicCabinet, so the directory is not created here.
///
/// # Errors
///
/// Returns an error if the system data directory cannot be determined.
pub fn default_db_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow!("Could not determine system data directory. Pass --db or set db_path in ~/.mpdcrc.")
    })?;
    Ok(data_dir.join("mpdc").join(DB_FILE_NAME))
}

/// Values read from a config file. Unset keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub track_limit: Option<usize>,
    pub related_artists_limit: Option<usize>,
    pub playlist_position: Option<PlaylistPosition>,
    pub shuffle: Option<bool>,
    pub shuffle_mpd: Option<bool>,
    pub dryrun: Option<bool>,
    pub verbose: Option<bool>,
    pub music_dir: Option<PathBuf>,
    pub mpd_host: Option<String>,
    pub mpd_port: Option<u16>,
    pub mpd_password: Option<String>,
    pub db_path: Option<PathBuf>,

    // Anything else, reported and dropped by `parse`.
    #[serde(flatten)]
    extra: BTreeMap<String, toml::Value>,
}

impl FileConfig {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading config file {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parses TOML config content. `~/` in path values is expanded.
    ///
    /// # Errors
    ///
    /// Returns the TOML error, which names the offending line.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;

        for key in std::mem::take(&mut config.extra).into_keys() {
            warn!("Ignoring unknown config key {key:?}");
        }
        config.music_dir = config.music_dir.map(expand_home);
        config.db_path = config.db_path.map(expand_home);

        Ok(config)
    }
}

// Works on the string so a trailing `/` survives.
fn expand_home(path: PathBuf) -> PathBuf {
    if let (Some(rest), Some(home)) = (path.to_str().and_then(|p| p.strip_prefix("~/")), dirs::home_dir()) {
        return home.join(rest);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(artist: &str) -> Args {
        Args {
            artist: Some(artist.to_string()),
            db: Some(PathBuf::from("/var/lib/mc.db")),
            ..Args::default()
        }
    }

    fn no_mpd_conf() -> Option<PathBuf> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&args_for("blur"), FileConfig::default(), no_mpd_conf).unwrap();

        assert_eq!(settings.selection, Selection::TopTracks { artist: "blur".into() });
        assert_eq!(settings.queue, QueueConfig::default());
        assert_eq!(settings.position, PlaylistPosition::Replace);
        assert!(!settings.shuffle_tracks);
        assert!(!settings.shuffle_queue);
        assert!(!settings.dry_run);
        assert_eq!(settings.music_dir, "");
        assert_eq!(settings.mpd, MpdSettings::default());
        assert_eq!(settings.db_path, PathBuf::from("/var/lib/mc.db"));
    }

    #[test]
    fn test_file_overrides_defaults_and_flags_override_file() {
        let file = FileConfig::parse(
            "track_limit = 40\n\
             related_artists_limit = 2\n\
             playlist_position = \"end\"\n\
             mpd_host = \"jukebox\"\n\
             mpd_port = 6601\n",
        )
        .unwrap();
        let args = Args {
            track_limit: Some(10),
            mpd_port: Some(7000),
            ..args_for("blur")
        };

        let settings = Settings::resolve(&args, file, no_mpd_conf).unwrap();
        assert_eq!(settings.queue.track_limit, 10);
        assert_eq!(settings.queue.per_artist_limit, 2);
        assert_eq!(settings.position, PlaylistPosition::End);
        assert_eq!(settings.mpd.host, "jukebox");
        assert_eq!(settings.mpd.port, 7000);
    }

    #[test]
    fn test_related_and_genres_force_shuffle() {
        let related = Args { related: true, ..args_for("blur") };
        assert!(Settings::resolve(&related, FileConfig::default(), no_mpd_conf).unwrap().shuffle_tracks);

        let genres = Args {
            artist: None,
            genres: Some("rock".into()),
            ..args_for("")
        };
        let settings = Settings::resolve(&genres, FileConfig::default(), no_mpd_conf).unwrap();
        assert_eq!(settings.selection, Selection::Genres { pattern: "rock".into() });
        assert!(settings.shuffle_tracks);
    }

    #[test]
    fn test_music_dir_gets_trailing_slash() {
        let args = Args {
            music_dir: Some(PathBuf::from("/srv/music")),
            ..args_for("blur")
        };
        let settings = Settings::resolve(&args, FileConfig::default(), no_mpd_conf).unwrap();
        assert_eq!(settings.music_dir, "/srv/music/");
    }

    #[test]
    fn test_music_dir_falls_back_to_mpd_conf() {
        let settings = Settings::resolve(&args_for("blur"), FileConfig::default(), || {
            Some(PathBuf::from("/var/lib/mpd/music"))
        })
        .unwrap();
        assert_eq!(settings.music_dir, "/var/lib/mpd/music/");
    }

    #[test]
    fn test_configured_music_dir_skips_detection() {
        let file = FileConfig::parse("music_dir = \"/data/music/\"\n").unwrap();
        let settings = Settings::resolve(&args_for("blur"), file, || panic!("detection should not run")).unwrap();
        assert_eq!(settings.music_dir, "/data/music/");
    }

    #[test]
    fn test_empty_password_means_none() {
        let file = FileConfig::parse("mpd_password = ''\n").unwrap();
        let settings = Settings::resolve(&args_for("blur"), file, no_mpd_conf).unwrap();
        assert_eq!(settings.mpd.password, None);
    }

    #[test]
    fn test_missing_selection_is_an_error() {
        let args = Args::default();
        assert!(Settings::resolve(&args, FileConfig::default(), no_mpd_conf).is_err());
    }

    #[test]
    fn test_parse_booleans_and_comments() {
        let file = FileConfig::parse(
            "# defaults for the living room\n\
             \n\
             shuffle = true\n\
             shuffle_mpd = false # inline\n\
             dryrun = true\n",
        )
        .unwrap();
        assert_eq!(file.shuffle, Some(true));
        assert_eq!(file.shuffle_mpd, Some(false));
        assert_eq!(file.dryrun, Some(true));
        assert_eq!(file.verbose, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let file = FileConfig::parse("db_user = \"postgres\"\ntrack_limit = 3\n").unwrap();
        assert_eq!(file.track_limit, Some(3));
        assert_eq!(file, FileConfig::parse("track_limit = 3").unwrap());
    }

    #[test]
    fn test_home_is_expanded_in_paths() {
        let file = FileConfig::parse("music_dir = \"~/Music/\"\ndb_path = \"/var/lib/mc.db\"\n").unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(file.music_dir.unwrap().to_str(), home.join("Music/").to_str());
        }
        assert_eq!(file.db_path, Some(PathBuf::from("/var/lib/mc.db")));
    }

    #[test]
    fn test_malformed_values_name_the_line() {
        let err = FileConfig::parse("track_limit = 5\nmpd_port = many\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));

        let err = FileConfig::parse("playlist_position = \"middle\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("replace"));

        assert!(FileConfig::parse("mpd_port = \"6600\"\n").is_err());
        assert!(FileConfig::parse("just some words\n").is_err());
    }

    #[test]
    fn test_default_db_path_structure() {
        let path = default_db_path().expect("Should get valid path");
        assert!(path.ends_with("mpdc/musiccabinet.db"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("mpdcrc");
        fs::write(&path, "track_limit = 12\n").unwrap();
        assert_eq!(FileConfig::load(&path).unwrap().track_limit, Some(12));
        assert!(FileConfig::load(&dir.path().join("missing")).is_err());
    }
}
