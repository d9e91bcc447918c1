// Operator interaction: confirmations, prompts and blocking messages

use std::io::{self, BufRead, Write};

/// Blocking questions and messages put to the operator.
pub trait Interaction: Send + Sync {
    fn confirm(&self, message: &str) -> bool;

    /// `None` when the operator dismisses the prompt.
    fn prompt(&self, message: &str, default: Option<&str>) -> Option<String>;

    fn alert(&self, message: &str);
}

/// Reads answers from stdin and writes messages to stderr.
#[derive(Debug, Default)]
pub struct TerminalInteraction {
    /// Answer yes to every confirmation.
    pub assume_yes: bool,
}

impl TerminalInteraction {
    fn read_line(&self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Interaction for TerminalInteraction {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{} [y/N] ", message);
        let _ = io::stderr().flush();
        matches!(
            self.read_line().as_deref().map(str::trim),
            Some("y") | Some("Y") | Some("yes")
        )
    }

    fn prompt(&self, message: &str, default: Option<&str>) -> Option<String> {
        match default {
            Some(d) => eprint!("{} [{}]: ", message, d),
            None => eprint!("{}: ", message),
        }
        let _ = io::stderr().flush();
        let line = self.read_line()?;
        if line.trim().is_empty() {
            default.map(str::to_string)
        } else {
            Some(line)
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}
