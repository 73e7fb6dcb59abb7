//! docchat CLI
//!
//! Main entry point for the docchat command-line tool.
//! Loads one PDF and answers questions about it with cited pages.

mod commands;

use anyhow::Context;
use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, PagesCommand, PromptsCommand};
use docchat_core::{config::AppConfig, logging, LogFormat};
use std::path::PathBuf;

/// docchat - ask questions about a PDF
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(about = "Ask questions about a PDF and get answers citing its pages", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "DOCCHAT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "DOCCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// PDF to load: a path (relative to the workspace) or an http(s) URL
    #[arg(short, long, global = true, env = "DOCCHAT_SOURCE")]
    source: Option<String>,

    /// Document title shown in answers (default: file name)
    #[arg(short, long, global = true)]
    title: Option<String>,

    /// Model-service provider (gemini, openai)
    #[arg(short, long, global = true, env = "DOCCHAT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "DOCCHAT_MODEL")]
    model: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (any non-empty NO_COLOR also disables it)
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = FalseyValueParser::new()
    )]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive chat about the document
    Chat(ChatCommand),

    /// Ask a single question and exit
    Ask(AskCommand),

    /// List the pages extracted from the document
    Pages(PagesCommand),

    /// List available prompts
    Prompts(PromptsCommand),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let mut config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())
        .context("Failed to load configuration")?
        .with_overrides(
            cli.workspace,
            cli.source,
            cli.title,
            cli.provider,
            cli.model,
            cli.log_level,
            cli.verbose,
            cli.no_color,
        );
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }

    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_format)?;
    config.validate()?;

    tracing::info!("docchat starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Source: {}", config.resolved_source());
    tracing::debug!("Provider: {} (model {})", config.provider, config.model);

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ask(_) => "ask",
        Commands::Pages(_) => "pages",
        Commands::Prompts(_) => "prompts",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Pages(cmd) => cmd.execute(&config).await,
        Commands::Prompts(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.with_context(|| format!("docchat {} failed", command_name))
}
