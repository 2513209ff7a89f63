//! Line-oriented terminal boundary.
//!
//! The core only writes lines and asks for input; rendering and colour
//! belong to whatever sits behind the trait. A `None` from any read means
//! the player disconnected.

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::thread;
use std::time::Duration;

pub trait Terminal {
    fn write_line(&mut self, line: &str);

    /// Show `prompt` and read one line, trimmed. `None` on disconnect.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Narrative pause; purely cosmetic.
    fn pause(&mut self, _ms: u64) {}

    fn write_lines(&mut self, lines: &[String]) {
        for line in lines {
            self.write_line(line);
        }
    }

    /// Single keypress equivalent: first character of the next line.
    fn read_key(&mut self, prompt: &str) -> Option<char> {
        let line = self.read_line(prompt)?;
        Some(line.chars().next().unwrap_or('\n'))
    }

    /// "Press enter" style wait.
    fn wait_for_key(&mut self) -> Option<()> {
        self.read_line("[press enter]").map(|_| ())
    }

    /// Read an integer in `[min, max]`, re-prompting on bad input.
    fn read_number(&mut self, prompt: &str, min: i64, max: i64) -> Option<i64> {
        loop {
            let line = self.read_line(prompt)?;
            match line.trim().parse::<i64>() {
                Ok(n) if (min..=max).contains(&n) => return Some(n),
                Ok(_) => self.write_line(&format!("Enter a number from {} to {}.", min, max)),
                Err(_) => self.write_line("That is not a number."),
            }
        }
    }

    /// Yes/no question, re-prompting until answered.
    fn confirm(&mut self, prompt: &str) -> Option<bool> {
        loop {
            let line = self.read_line(&format!("{} (Y/N)", prompt))?;
            match line.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Some(true),
                "n" | "no" => return Some(false),
                _ => self.write_line("Please answer Y or N."),
            }
        }
    }
}

/// Blocking stdin/stdout terminal.
pub struct StdTerminal {
    pacing: bool,
}

impl StdTerminal {
    pub fn new(pacing: bool) -> Self {
        Self { pacing }
    }
}

impl Terminal for StdTerminal {
    fn write_line(&mut self, line: &str) {
        println!("{}", line);
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        print!("{} ", prompt);
        let _ = std::io::stdout().flush();
        let mut buf = String::new();
        match std::io::stdin().lock().read_line(&mut buf) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(buf.trim().to_string()),
        }
    }

    fn pause(&mut self, ms: u64) {
        if self.pacing && ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

/// Feeds queued input and records output. Runs out of input = disconnect.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    input: VecDeque<String>,
    output: Vec<String>,
    prompts: Vec<String>,
}

impl ScriptedTerminal {
    pub fn new<I, S>(input: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            output: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn push_input(&mut self, line: &str) {
        self.input.push_back(line.to_string());
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// True if any output line contains `needle`.
    pub fn saw(&self, needle: &str) -> bool {
        self.output.iter().any(|line| line.contains(needle))
    }

    /// True if any prompt shown so far contains `needle`, answered or not.
    pub fn was_asked(&self, needle: &str) -> bool {
        self.prompts.iter().any(|prompt| prompt.contains(needle))
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }
}

impl Terminal for ScriptedTerminal {
    fn write_line(&mut self, line: &str) {
        self.output.push(line.to_string());
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.input.pop_front().map(|line| line.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_number_reprompts_until_valid() {
        let mut term = ScriptedTerminal::new(["abc", "99", "3"]);
        assert_eq!(term.read_number("How many?", 1, 5), Some(3));
        assert!(term.saw("That is not a number."));
        assert!(term.saw("Enter a number from 1 to 5."));
    }

    #[test]
    fn confirm_understands_yes_and_no() {
        let mut term = ScriptedTerminal::new(["maybe", "Y", "no"]);
        assert_eq!(term.confirm("Sure?"), Some(true));
        assert_eq!(term.confirm("Sure?"), Some(false));
        assert_eq!(term.confirm("Sure?"), None);
        assert!(term.was_asked("Sure? (Y/N)"));
    }

    #[test]
    fn exhausted_input_is_disconnect() {
        let mut term = ScriptedTerminal::new(Vec::<String>::new());
        assert_eq!(term.read_line(">"), None);
        assert_eq!(term.read_key(">"), None);
    }
}
