//! # Shell Completion Module
//!
//! ```bash
//! # Generate bash completions
//! tunegraph completion bash > ~/.local/share/bash-completion/completions/tunegraph
//!
//! # Generate zsh completions
//! tunegraph completion zsh > ~/.config/zsh/completions/_tunegraph
//! ```

use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

use crate::cli::Shell;

/// Generate shell completions for the given shell into `out`
pub fn write_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Generate shell completions for the given shell on stdout
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    write_completions(gen, cmd, &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::CommandFactory;

    #[test]
    fn test_bash_completion_mentions_subcommands() {
        let mut out = Vec::new();
        write_completions(shell_to_completion_shell(Shell::Bash), &mut Args::command(), &mut out);

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("tunegraph"));
        assert!(script.contains("neighbours"));
        assert!(script.contains("build"));
    }
}
