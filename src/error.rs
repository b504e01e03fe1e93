//! Selection failures that end a run before anything reaches MPD.
//!
//! Store and daemon failures are plain `anyhow` errors; only the outcomes a
//! user can fix by changing the pattern or the disambiguation input live here.

use thiserror::Error;

/// Hard ceiling on artist matches before the user must narrow the pattern.
pub const MAX_ARTIST_MATCHES: usize = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The artist pattern matched nothing in the library.
    #[error("No match for artist regexp \"/{0}/\"")]
    NoMatch(String),

    #[error("Too many matches ({count}) for \"{pattern}\", please be more specific")]
    TooManyMatches { pattern: String, count: usize },

    /// The strategy needs exactly one artist but got the "all" answer.
    #[error("You must choose ONE number")]
    AmbiguousSelection,

    #[error("Invalid choice \"{input}\", expected a number between 0 and {max}")]
    InvalidSelection { input: String, max: usize },

    #[error("No match for genre tag regexp \"/{0}/\"")]
    NoGenreMatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_pattern() {
        assert_eq!(
            SelectionError::NoMatch("^beat".into()).to_string(),
            "No match for artist regexp \"/^beat/\""
        );
        assert_eq!(
            SelectionError::NoGenreMatch("jazz".into()).to_string(),
            "No match for genre tag regexp \"/jazz/\""
        );
    }

    #[test]
    fn test_invalid_selection_reports_range() {
        let err = SelectionError::InvalidSelection { input: "x".into(), max: 4 };
        assert!(err.to_string().contains("between 0 and 4"));
    }

    #[test]
    fn test_selection_error_converts_to_anyhow() {
        let err: anyhow::Error = SelectionError::AmbiguousSelection.into();
        assert_eq!(
            err.downcast_ref::<SelectionError>(),
            Some(&SelectionError::AmbiguousSelection)
        );
    }
}
