//! # Path Translation Module
//!
//! The library stores absolute directories (`/srv/music/Blur/Parklife`) while
//! MPD wants paths relative to its `music_directory` (`Blur/Parklife/01.flac`).
//!
//! ## Rules
//!
//! - The music root is removed from the directory path once, at its first
//!   occurrence.
//! - A directory that does not contain the root passes through unchanged.
//!   Store paths and the configured root can come from different historical
//!   setups, so this is logged rather than treated as an error.
//! - The directory and filename are joined with `/`, the separator MPD uses
//!   on every platform.
//!
//! ## Usage
//!
//! ```
//! use mpdc::path_translator;
//!
//! let rel = path_translator::to_mpd_relative("/music/Blur/Parklife", "01.flac", "/music/");
//! assert_eq!(rel, "Blur/Parklife/01.flac");
//! ```

use log::debug;

/// Ensures a non-empty music root ends with `/`. Returns the normalized root
/// and whether a separator had to be added.
#[must_use]
pub fn normalize_root(root: &str) -> (String, bool) {
    if root.is_empty() || root.ends_with('/') {
        (root.to_string(), false)
    } else {
        (format!("{root}/"), true)
    }
}

/// Strips `music_root` from `directory` (first occurrence only).
#[must_use]
pub fn strip_music_root<'a>(directory: &'a str, music_root: &str) -> std::borrow::Cow<'a, str> {
    if music_root.is_empty() {
        return directory.into();
    }

    // A track stored directly in the root: "/music" against "/music/".
    if music_root.strip_suffix('/') == Some(directory) {
        return "".into();
    }

    if directory.contains(music_root) {
        directory.replacen(music_root, "", 1).into()
    } else {
        debug!("Music root {music_root:?} not found in {directory:?}, passing path through");
        directory.into()
    }
}

/// MPD-relative path for a file in `directory`.
#[must_use]
pub fn to_mpd_relative(directory: &str, filename: &str, music_root: &str) -> String {
    let stripped = strip_music_root(directory, music_root);
    let stripped = stripped.trim_end_matches('/');
    if stripped.is_empty() {
        filename.to_string()
    } else {
        format!("{stripped}/{filename}")
    }
}
