//! Interactive confirmation for destructive operations.

use std::io::{BufRead, IsTerminal, Write};

use fcli_tool::ConfirmationGate;

/// Confirms via `--yes`, or by asking on an interactive terminal.
///
/// Without `--yes` and without a terminal on stdin, every prompt is refused.
#[derive(Debug, Clone, Copy)]
pub struct PromptGate {
    assume_yes: bool,
}

impl PromptGate {
    #[must_use]
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ConfirmationGate for PromptGate {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !std::io::stdin().is_terminal() {
            eprintln!("{prompt}");
            return false;
        }

        eprint!("{prompt} [y/N] ");
        std::io::stderr().flush().ok();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
