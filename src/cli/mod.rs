//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ragscope",
    version,
    author = "neur0map",
    about = "Retrieval-augmented question answering with explainable relevance validation",
    long_about = "Ragscope indexes a document collection, answers questions by retrieving the most \
                  relevant documents as context for a chat model, and explains why each document \
                  was (or was not) used."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/ragscope/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply (e.g., "strict", "lexical")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Number of documents to retrieve per question (overrides configuration)
    #[arg(short = 'n', long, global = true, value_name = "COUNT")]
    pub documents: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive question-and-answer session
    Chat,

    /// Answer a single question
    Ask {
        /// Question to ask
        question: String,

        /// Print the relevance analysis after the answer
        #[arg(long)]
        trace: bool,
    },

    /// Show how retrieved documents score for a question, without generating
    Analyze {
        /// Question to analyze
        question: String,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Assess the quality of the configured document collection
    Quality {
        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_document_count() {
        let cli = Cli::parse_from(["ragscope", "ask", "Where are apples cheapest?", "-n", "3"]);
        assert_eq!(cli.documents, Some(3));
        match cli.command {
            Commands::Ask { question, trace } => {
                assert_eq!(question, "Where are apples cheapest?");
                assert!(!trace);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::parse_from(["ragscope", "--profile", "strict", "config", "init", "--force"]);
        assert_eq!(cli.profile.as_deref(), Some("strict"));
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
