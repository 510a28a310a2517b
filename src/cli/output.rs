//! Colored output helpers for CLI
//!
//! Provides consistent, colored terminal output for the slidesbot binary,
//! including the internal steps of a run (summary rounds, specialist rounds).

use crate::observer::{ProgressObserver, RoundReport};
use crate::types::{AnswerEnvelope, Query};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Output style configuration
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self { colored: true }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self { colored: false }
    }

    /// Print the startup banner
    pub fn banner(&self) {
        if self.colored {
            println!(
                "\n  {} {}\n",
                "SlidesBot".bright_cyan().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            );
        } else {
            println!("\n  SlidesBot v{}\n", env!("CARGO_PKG_VERSION"));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "✓".green().bold(), message.green());
        } else {
            println!("  [OK] {}", message);
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "•".blue(), message);
        } else {
            println!("  [INFO] {}", message);
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            println!("  {} {}", "⚠".yellow().bold(), message.yellow());
        } else {
            println!("  [WARN] {}", message);
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {}", message);
        }
    }

    /// Print a bold heading
    pub fn heading(&self, title: &str) {
        if self.colored {
            println!("\n{}", title.bold());
        } else {
            println!("\n{}", title);
        }
    }

    fn separator(&self) {
        if self.colored {
            println!("{}", "-".repeat(20).dimmed());
        } else {
            println!("{}", "-".repeat(20));
        }
    }

    /// Print the final answer of a conversation
    pub fn final_answer(&self, answer: &str) {
        self.heading("Final answer:");
        println!("\n{}\n", answer);
    }

    /// Show the interactive prompt and read one line.
    ///
    /// Returns `None` on end of input.
    pub fn prompt(&self) -> io::Result<Option<String>> {
        if self.colored {
            print!("\n{} ", "?".bright_yellow().bold());
        } else {
            print!("\n> ");
        }
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl ProgressObserver for Output {
    fn summary_round(&self, report: &RoundReport) {
        let message = format!(
            "Summary round {}: {}/{} lectures summarized, {} remaining",
            report.round,
            report.succeeded.len(),
            report.attempted.len(),
            report.remaining.len()
        );
        if report.failed.is_empty() {
            self.success(&message);
        } else {
            self.warning(&message);
        }
    }

    fn questions_dispatched(&self, reasoning: &str, queries: &[Query]) {
        self.heading(&format!("Asking questions based on reasoning: {}", reasoning));
        match serde_json::to_string_pretty(queries) {
            Ok(json) => println!("{}", json),
            Err(_) => {
                for query in queries {
                    println!("  lecture {}: {}", query.resource_id, query.question);
                }
            }
        }
        self.separator();
    }

    fn answers_received(&self, queries: &[Query], answers: &[AnswerEnvelope]) {
        self.heading("Received answers from lectures:");
        for (query, answer) in queries.iter().zip(answers) {
            println!(
                "\nQuestion:\n\tOver Lecture {}\n\t{}\n\nAnswer: {}\n",
                query.resource_id,
                query.question,
                answer.render()
            );
            self.separator();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_new() {
        let output = Output::new();
        assert!(output.colored);
    }

    #[test]
    fn test_output_no_color() {
        let output = Output::no_color();
        assert!(!output.colored);
    }

    #[test]
    fn test_output_default() {
        let output = Output::default();
        assert!(output.colored);
    }

    #[test]
    fn test_observer_events_do_not_panic() {
        let output = Output::no_color();
        let queries = vec![Query::new(1, "q")];
        output.summary_round(&RoundReport {
            round: 1,
            attempted: vec![0, 1],
            succeeded: vec![0],
            failed: vec![1],
            remaining: vec![1],
        });
        output.questions_dispatched("because", &queries);
        output.answers_received(&queries, &[AnswerEnvelope::error(1, "boom")]);
        output.final_answer("done");
    }
}
