//! # Shell Completion Module
//!
//! Completion scripts generated from the clap definition in [`crate::cli`].
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! mpdc --completions bash > ~/.local/share/bash-completion/completions/mpdc
//!
//! # Generate zsh completions
//! mpdc --completions zsh > ~/.config/zsh/completions/_mpdc
//! ```

use crate::cli::{Args, Shell};
use clap::{Command, CommandFactory};
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::Write;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Completion script for `mpdc` itself.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Args::command();
    generate_completions(shell_to_completion_shell(shell), &mut cmd, out);
}

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}
