//! Interactive confirmation on the controlling terminal.

use std::io::{self, BufRead, Write};

use witness_core::traits::Confirmer;

/// Asks on stderr and reads one line from stdin.
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, command: &str) -> bool {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        ask(command, &mut input, &mut io::stderr())
    }
}

/// Prompt for `command` on `output` and read the answer from `input`.
///
/// A read error or EOF counts as a decline.
fn ask(command: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    let _ = write!(output, "witness: run `{}`? [y/N] ", command);
    let _ = output.flush();

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_affirmative(&answer),
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
