//! # Artist Resolver
//!
//! Turns a user-supplied name pattern into concrete artists. A pattern that
//! matches several artists is disambiguated interactively through a
//! [`Chooser`]; what an empty answer means depends on the strategy:
//!
//! - [`ArtistResolver::top_tracks`] treats it as "all of the above" and
//!   returns the union of every match.
//! - [`ArtistResolver::related`] needs one seed artist and rejects it with
//!   [`SelectionError::AmbiguousSelection`].
//!
//! Artists are never guessed: the result is exactly one artist or an
//! explicit set the user asked for.

use crate::db::MetadataStore;
use crate::error::{SelectionError, MAX_ARTIST_MATCHES};
use crate::track::{Artist, ArtistSet};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::io::{self, BufRead, Write};

/// What the user is asked when a pattern is ambiguous.
#[derive(Debug)]
pub struct ChoicePrompt<'a> {
    pub pattern: &'a str,
    /// Shown as `[index] name`.
    pub candidates: &'a [Artist],
    /// Whether an empty answer selects every candidate.
    pub allow_all: bool,
}

impl ChoicePrompt<'_> {
    /// `[0-4|nil=all]` or `[0-4]`
    #[must_use]
    pub fn range_hint(&self) -> String {
        let last = self.candidates.len().saturating_sub(1);
        if self.allow_all {
            format!("[0-{last}|nil=all]")
        } else {
            format!("[0-{last}]")
        }
    }
}

/// Source of the user's disambiguation answer.
pub trait Chooser {
    /// Presents the prompt and returns the raw answer, without the line ending.
    ///
    /// # Errors
    ///
    /// Returns an error if the answer cannot be read.
    fn choose(&mut self, prompt: &ChoicePrompt<'_>) -> Result<String>;
}

/// Prompts on stdout and reads one line from stdin.
#[derive(Debug, Default)]
pub struct StdinChooser;

impl Chooser for StdinChooser {
    fn choose(&mut self, prompt: &ChoicePrompt<'_>) -> Result<String> {
        let mut stdout = io::stdout().lock();
        for (index, artist) in prompt.candidates.iter().enumerate() {
            writeln!(stdout, "[{index}] {}", artist.name)?;
        }
        write!(
            stdout,
            "There are {} matches for \"{}\", please choose a number {}: ",
            prompt.candidates.len(),
            prompt.pattern,
            prompt.range_hint()
        )?;
        stdout.flush()?;
        // The Ctrl-C handler prints, so stdout must not stay locked while waiting.
        drop(stdout);

        read_answer(io::stdin().lock())
    }
}

/// Reads one answer line. End of input is an error, not an empty answer.
fn read_answer<R: BufRead>(mut input: R) -> Result<String> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("Failed to read artist choice from stdin")?;
    if read == 0 {
        bail!("No artist choice given (stdin closed)");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Parsed disambiguation answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Index(usize),
    All,
}

/// Matches before disambiguation.
#[derive(Debug)]
enum Matches {
    One(Artist),
    Many(Vec<Artist>),
}

/// Resolves artist patterns against a [`MetadataStore`].
pub struct ArtistResolver<'a, S: MetadataStore, C: Chooser> {
    store: &'a S,
    chooser: &'a mut C,
    case_insensitive: bool,
}

impl<'a, S: MetadataStore, C: Chooser> ArtistResolver<'a, S, C> {
    /// Case-insensitive resolver.
    pub fn new(store: &'a S, chooser: &'a mut C) -> Self {
        Self {
            store,
            chooser,
            case_insensitive: true,
        }
    }

    #[must_use]
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.case_insensitive = yes;
        self
    }

    /// Resolves `pattern` for the top-tracks strategy. An empty answer to the
    /// prompt selects every match.
    ///
    /// # Errors
    ///
    /// [`SelectionError::NoMatch`], [`SelectionError::TooManyMatches`] or
    /// [`SelectionError::InvalidSelection`], or a store/prompt failure.
    pub fn top_tracks(&mut self, pattern: &str) -> Result<ArtistSet> {
        match self.lookup(pattern)? {
            Matches::One(artist) => Ok(ArtistSet::single(artist)),
            Matches::Many(artists) => match self.ask(pattern, &artists, true)? {
                Choice::Index(index) => Ok(ArtistSet::single(artists[index].clone())),
                Choice::All => {
                    info!("Using all {} artists matching /{pattern}/", artists.len());
                    ArtistSet::union(artists).ok_or_else(|| SelectionError::NoMatch(pattern.to_string()).into())
                }
            },
        }
    }

    /// Resolves `pattern` to the single seed artist of the related strategy.
    ///
    /// # Errors
    ///
    /// As [`Self::top_tracks`], plus [`SelectionError::AmbiguousSelection`]
    /// when the prompt is answered with nothing.
    pub fn related(&mut self, pattern: &str) -> Result<Artist> {
        match self.lookup(pattern)? {
            Matches::One(artist) => Ok(artist),
            Matches::Many(artists) => match self.ask(pattern, &artists, false)? {
                Choice::Index(index) => Ok(artists[index].clone()),
                Choice::All => Err(SelectionError::AmbiguousSelection.into()),
            },
        }
    }

    fn lookup(&self, pattern: &str) -> Result<Matches> {
        let regex = if self.case_insensitive {
            format!("(?i){pattern}")
        } else {
            pattern.to_string()
        };

        let mut artists = self.store.search_artists(&regex)?;
        debug!("Artist pattern /{regex}/ matched {} rows", artists.len());

        match artists.len() {
            0 => Err(SelectionError::NoMatch(pattern.to_string()).into()),
            1 => Ok(Matches::One(artists.remove(0))),
            count if count > MAX_ARTIST_MATCHES => Err(SelectionError::TooManyMatches {
                pattern: pattern.to_string(),
                count,
            }
            .into()),
            _ => Ok(Matches::Many(artists)),
        }
    }

    fn ask(&mut self, pattern: &str, artists: &[Artist], allow_all: bool) -> Result<Choice> {
        let prompt = ChoicePrompt {
            pattern,
            candidates: artists,
            allow_all,
        };
        let answer = self.chooser.choose(&prompt)?;
        Ok(parse_choice(&answer, artists.len())?)
    }
}

/// An empty (or whitespace) answer means "all"; anything else must be an
/// index below `rows`.
fn parse_choice(answer: &str, rows: usize) -> Result<Choice, SelectionError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(Choice::All);
    }

    let invalid = || SelectionError::InvalidSelection {
        input: answer.to_string(),
        max: rows.saturating_sub(1),
    };
    match answer.parse::<usize>() {
        Ok(index) if index < rows => Ok(Choice::Index(index)),
        _ => Err(invalid()),
    }
}
