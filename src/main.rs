use ragscope::cli::{Cli, Commands, ConfigAction};
use ragscope::config::{Config, ConfigValidator};
use ragscope::documents::{AssistantProfile, DocumentSet};
use ragscope::error::{RagError, Result};
use ragscope::rag::{IngestPipeline, RagAnswer, RagOrchestrator};
use ragscope::session::{ChatSession, SessionCommand, SessionNotice};
use ragscope::{embedding, generation};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Chat => {
            let config = load_config(cli.config, cli.profile, cli.documents)?;
            cmd_chat(&config).await?;
        }
        Commands::Ask { question, trace } => {
            let config = load_config(cli.config, cli.profile, cli.documents)?;
            cmd_ask(&config, &question, trace).await?;
        }
        Commands::Analyze { question, json } => {
            let config = load_config(cli.config, cli.profile, cli.documents)?;
            cmd_analyze(&config, &question, json).await?;
        }
        Commands::Quality { json } => {
            let config = load_config(cli.config, cli.profile, cli.documents)?;
            cmd_quality(&config, json)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "ragscope=debug"
    } else {
        "ragscope=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // stdout carries answers and JSON output
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Orchestrator plus what the presentation layer needs around it
struct Assistant {
    orchestrator: RagOrchestrator,
    profile: AssistantProfile,
    document_count: usize,
    indexed: usize,
    source: PathBuf,
}

impl Assistant {
    /// Answer `question`; Ctrl-C cancels the call in flight
    async fn answer(&self, question: &str) -> Result<RagAnswer> {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                trigger.cancel();
            }
        });

        let result = self
            .orchestrator
            .answer_query_with(
                question,
                &self.profile.system_prompt,
                self.document_count,
                &cancel,
            )
            .await;

        watcher.abort();
        result
    }
}

async fn build_assistant(config: &Config) -> Result<Assistant> {
    let source = expand_path(&config.data.documents_file)?;
    let set = DocumentSet::load(&source)?;

    let embedder = embedding::create_provider(&config.embedding)?;
    let pipeline = IngestPipeline::new(
        Arc::clone(&embedder),
        config.embedding.concurrency,
        config.quality_scorer()?,
        config.search.mode,
        config.search.hnsw_params(),
    );

    let outcome = pipeline
        .run(set.documents, |progress| {
            eprint!(
                "\r  Embedding documents: {}/{} ({}%)",
                progress.completed,
                progress.total,
                progress.percentage()
            );
            std::io::stderr().flush().ok();
        })
        .await?;
    eprintln!();

    if !outcome.failed.is_empty() {
        tracing::warn!(
            "Skipped {} documents that failed to embed: {}",
            outcome.failed.len(),
            outcome.failed.join(", ")
        );
    }

    let indexed = outcome.index.len();
    let generator = generation::create_provider(&config.generation)?;
    let orchestrator = RagOrchestrator::new(
        embedder,
        Arc::new(outcome.index),
        generator,
        config.relevance_scorer()?,
    )
    .with_call_timeout(config.timeouts.provider_call());

    Ok(Assistant {
        orchestrator,
        profile: set.metadata,
        document_count: config.relevance.document_count,
        indexed,
        source,
    })
}

async fn cmd_chat(config: &Config) -> Result<()> {
    let assistant = build_assistant(config).await?;
    let mut session = ChatSession::new(assistant.profile.clone());

    println!("{}", assistant.profile.title);
    println!("{}", assistant.profile.welcome_message);
    println!("Type 'help' for examples and commands, 'quit' to leave.");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\n> ");
        std::io::stdout().flush().ok();

        let line = match lines.next() {
            Some(line) => line.map_err(|e| RagError::Io {
                source: e,
                context: "Failed to read from stdin".to_string(),
            })?,
            None => break,
        };

        match SessionCommand::parse(&line) {
            SessionCommand::Empty => continue,
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{}", session.help_text()),
            SessionCommand::History => println!("{}", session.history_text()),
            SessionCommand::Stats => println!("{}", session.stats_text()),
            SessionCommand::Info => print_info(&assistant, config),
            SessionCommand::Trace => {
                let state = if session.toggle_trace() {
                    "enabled"
                } else {
                    "disabled"
                };
                println!("Relevance trace {}", state);
            }
            SessionCommand::Question(question) => match assistant.answer(&question).await {
                Ok(outcome) => {
                    println!("\n{}", outcome.answer);
                    if session.trace_enabled() {
                        println!("\n{}", outcome.validation.detailed_report());
                    }
                    for notice in session.record_answer(&question, &outcome.answer, outcome.elapsed) {
                        match notice {
                            SessionNotice::Tip(tip) => println!("\nTip: {}", tip),
                            SessionNotice::Encouragement(message) => println!("\n{}", message),
                        }
                    }
                }
                Err(e) => {
                    println!("✗ {}", e);
                    if let Some(advice) = session.error_advice() {
                        println!("  {}", advice);
                    }
                }
            },
        }
    }

    println!();
    println!("✓ Session {} ended", session.id());
    println!("{}", session.stats_text());
    println!("Goodbye!");

    Ok(())
}

fn print_info(assistant: &Assistant, config: &Config) {
    println!("Documents: {} indexed from {}", assistant.indexed, assistant.source.display());
    println!(
        "Embedding: {} ({}, {}D)",
        config.embedding.model, config.embedding.provider, config.embedding.dimension
    );
    println!("Search mode: {}", config.search.mode);
    println!("Generation model: {}", config.generation.model);
    println!(
        "Relevance: {} documents per question, thresholds {:.2} / {:.2}",
        assistant.document_count, config.relevance.min_threshold, config.relevance.high_threshold
    );
}

async fn cmd_ask(config: &Config, question: &str, trace: bool) -> Result<()> {
    let assistant = build_assistant(config).await?;
    let outcome = assistant.answer(question).await?;

    println!("{}", outcome.answer);

    if trace {
        println!();
        println!("{}", outcome.validation.detailed_report());
        println!(
            "Context: {} documents, {} characters, mean score {:.3}",
            outcome.context_stats.included,
            outcome.context_stats.characters,
            outcome.context_stats.mean_score
        );
    }

    Ok(())
}

async fn cmd_analyze(config: &Config, question: &str, json: bool) -> Result<()> {
    let assistant = build_assistant(config).await?;
    let validation = assistant
        .orchestrator
        .analyze_relevance(question, assistant.document_count)
        .await?;

    if json {
        let output = serde_json::to_string_pretty(&validation).map_err(|e| RagError::Json {
            source: e,
            context: "Failed to serialize relevance analysis".to_string(),
        })?;
        println!("{}", output);
    } else {
        println!("{}", validation.detailed_report());
    }

    Ok(())
}

fn cmd_quality(config: &Config, json: bool) -> Result<()> {
    let source = expand_path(&config.data.documents_file)?;
    let set = DocumentSet::load(&source)?;
    let scorer = config.quality_scorer()?;

    if json {
        let reports = scorer.assess_all(&set.documents);
        let output = serde_json::to_string_pretty(&reports).map_err(|e| RagError::Json {
            source: e,
            context: "Failed to serialize quality reports".to_string(),
        })?;
        println!("{}", output);
    } else {
        println!("{}", scorer.collection_report(&set.documents));
    }

    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile, None)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| RagError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Documents: {}", config.data.documents_file.display());
            println!("  Search mode: {}", config.search.mode);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            // Create parent directory
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| RagError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            // Save default config
            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
            println!(
                "  Point data.documents_file at your document collection (currently {})",
                config.data.documents_file.display()
            );
        }
    }

    Ok(())
}

fn load_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    document_count: Option<usize>,
) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => read_config(&path, profile.as_deref())?,
        None => {
            let path = Config::default_path()?;
            if path.exists() {
                read_config(&path, profile.as_deref())?
            } else {
                tracing::warn!(
                    "Config file not found, using defaults. Run 'ragscope config init' to create one."
                );
                let mut config = Config::default();
                if let Some(profile) = profile.as_deref() {
                    config.apply_profile(profile)?;
                }
                config.apply_env_overrides();
                ConfigValidator::validate(&config)?;
                config
            }
        }
    };

    if let Some(count) = document_count {
        config.relevance.document_count = count;
        ConfigValidator::validate(&config)?;
    }

    Ok(config)
}

fn read_config(path: &Path, profile: Option<&str>) -> Result<Config> {
    match profile {
        Some(profile) => Config::load_with_profile(path, profile),
        None => Config::load(path),
    }
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| RagError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| RagError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
