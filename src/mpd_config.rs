//! # MPD Configuration Lookup
//!
//! When no music root is configured for mpdc, the `music_directory` setting of
//! the local MPD installation is the next best answer: it is exactly the
//! prefix MPD expects to be removed from absolute paths.
//!
//! Candidate files are checked in the order MPD itself searches them.

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Finds MPD's music directory in the usual `mpd.conf` locations.
///
/// Returns `None` when no readable config names an existing directory.
#[must_use]
pub fn detect_music_directory() -> Option<PathBuf> {
    let config_paths = [
        dirs::config_dir().map(|p| p.join("mpd").join("mpd.conf")),
        dirs::home_dir().map(|p| p.join(".mpdconf")),
        Some(PathBuf::from("/etc/mpd.conf")),
        Some(PathBuf::from("/usr/local/etc/mpd.conf")),
    ];

    for path in config_paths.iter().flatten() {
        match parse_config_file(path) {
            Ok(dir) => {
                info!("Using MPD music directory {} from {}", dir.display(), path.display());
                return Some(dir);
            }
            Err(e) => debug!("{e:#}"),
        }
    }

    None
}

/// Reads `music_directory` from one MPD config file.
///
/// # Errors
///
/// Returns an error if the file is missing or unreadable, has no
/// `music_directory` line, or names a directory that does not exist.
pub fn parse_config_file(config_path: &Path) -> Result<PathBuf> {
    if !config_path.exists() {
        return Err(anyhow!("MPD config not found: {}", config_path.display()));
    }

    let content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read MPD config: {}", config_path.display()))?;

    let value = music_directory_value(&content)
        .ok_or_else(|| anyhow!("No music_directory in {}", config_path.display()))?;
    let dir = expand_home(value);

    if dir.is_dir() {
        Ok(dir)
    } else {
        warn!(
            "music_directory in {} does not exist: {}",
            config_path.display(),
            dir.display()
        );
        Err(anyhow!("music_directory {} is not a directory", dir.display()))
    }
}

/// Value of the first uncommented `music_directory` setting.
fn music_directory_value(content: &str) -> Option<&str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let rest = line.strip_prefix("music_directory")?;
            if !rest.starts_with(char::is_whitespace) {
                return None;
            }
            let value = rest.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then_some(value)
        })
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}
