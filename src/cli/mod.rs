//! CLI module for SlidesBot
//!
//! Provides command-line interface parsing for the slidesbot binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// SlidesBot - answers course questions by consulting one agent per lecture
#[derive(Parser, Debug)]
#[command(
    name = "slidesbot",
    version,
    about = "SlidesBot - course Q&A through per-lecture specialist agents",
    long_about = "A coordinator model reads a summary of every lecture, asks targeted\n\
                  questions to specialist agents that each see exactly one lecture,\n\
                  and synthesizes their answers.\n\n\
                  Missing lecture summaries are generated on startup.",
    after_help = "EXAMPLES:\n    \
                  slidesbot -q \"How do I pass arrays to functions in C?\"\n    \
                  slidesbot --max-iterations 10 -q \"Explain RAII\"\n    \
                  slidesbot --config-llm my_llm.json   # Interactive mode with custom credentials\n    \
                  slidesbot summarize                  # Only build summary.json"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "slidesbot.toml", global = true)]
    pub config: PathBuf,

    /// Path to an LLM configuration JSON file (api_key, base_url, basic_model, reasoner_model)
    #[arg(long, global = true)]
    pub config_llm: Option<PathBuf>,

    /// Maximum coordinator turns before a final answer is forced
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// The question to ask. Without one, questions are read interactively.
    #[arg(short, long)]
    pub question: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate missing lecture summaries and exit
    Summarize,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Whether an interactive input line ends the session.
pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["slidesbot"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("slidesbot.toml"));
        assert!(cli.config_llm.is_none());
        assert!(cli.max_iterations.is_none());
        assert!(cli.question.is_none());
        assert!(!cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_question_mode() {
        let cli = Cli::try_parse_from([
            "slidesbot",
            "--config-llm",
            "llm.json",
            "--max-iterations",
            "3",
            "-q",
            "What is a pointer?",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cli.config_llm, Some(PathBuf::from("llm.json")));
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.question.as_deref(), Some("What is a pointer?"));
        assert!(cli.no_color);
    }

    #[test]
    fn test_summarize_subcommand() {
        let cli = Cli::try_parse_from(["slidesbot", "summarize", "-c", "course.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Summarize)));
        assert_eq!(cli.config, PathBuf::from("course.toml"));
    }

    #[test]
    fn test_rejects_bad_iteration_count() {
        assert!(Cli::try_parse_from(["slidesbot", "--max-iterations", "many"]).is_err());
    }

    #[test]
    fn test_exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("  QUIT \n"));
        assert!(!is_exit_command("exit the loop early?"));
    }
}
