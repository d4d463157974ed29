//! CLI command definitions for the `abacus` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod skill;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Run schema-validated financial skills from the command line or over HTTP.
#[derive(Parser)]
#[command(name = "abacus", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Detailed logs (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to abacus.toml (defaults to $ABACUS_CONFIG, then ~/.abacus/abacus.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides config).
        #[arg(long)]
        host: Option<String>,
    },

    /// List registered skills.
    #[command(alias = "ls")]
    List {
        /// Filter by search terms (tags, name, description).
        #[arg(long, short = 'Q')]
        query: Option<String>,

        /// Print the markdown catalog summary instead of a table.
        #[arg(long)]
        prompt: bool,
    },

    /// Show a skill's parameters and default values.
    Describe {
        /// Skill id, e.g. "tax.calculate".
        id: String,
    },

    /// Execute a skill.
    Run {
        /// Skill id, e.g. "tax.calculate".
        id: String,

        /// Input object as JSON.
        #[arg(long, short, default_value = "{}")]
        input: String,

        /// Pass the output through the skill's presentation adapter.
        #[arg(long)]
        adapt: bool,
    },

    /// Execute a chain of skills from a JSON file ("-" reads stdin).
    Chain {
        /// File holding `[{skillId, input}, ...]` or `{ "skills": [...] }`.
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Log level forced by `-v` / `--quiet`, if any.
    pub fn level_override(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,abacus=debug"),
            _ => Some("trace"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_input() {
        let cli = Cli::try_parse_from([
            "abacus",
            "run",
            "tax.calculate",
            "--input",
            r#"{"annualIncome": 1}"#,
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Run { id, input, adapt } => {
                assert_eq!(id, "tax.calculate");
                assert!(input.contains("annualIncome"));
                assert!(!adapt);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_verbosity_overrides() {
        let quiet = Cli::try_parse_from(["abacus", "-q", "list"]).unwrap();
        assert_eq!(quiet.level_override(), Some("error"));

        let plain = Cli::try_parse_from(["abacus", "list"]).unwrap();
        assert_eq!(plain.level_override(), None);

        let loud = Cli::try_parse_from(["abacus", "-vv", "list"]).unwrap();
        assert_eq!(loud.level_override(), Some("trace"));
    }
}
