//! Watson CLI - A command line interface for Watson cloud AI services.

use clap::{Parser, Subcommand};

mod commands;

use commands::{
    AssistantCommand, ConfigCommand, NluCommand, SttCommand, TranslateCommand, TtsCommand,
};

/// Watson CLI - A command line interface for Watson cloud AI services.
///
/// This tool allows you to interact with:
///   - Speech to Text: one-shot and streaming recognition
///   - Text to Speech: voice synthesis
///   - Language Translator: translation and language identification
///   - Natural Language Understanding: text analysis
///   - Assistant: dialog messages
///
/// Configuration is stored in ~/.cogkit/watson/ and supports multiple contexts,
/// similar to kubectl's context management.
#[derive(Parser)]
#[command(name = "watson")]
#[command(about = "Watson services CLI tool")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.cogkit/watson/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Context name to use
    #[arg(short = 'c', long, global = true)]
    pub context: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input request file (YAML or JSON, `-` for stdin)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Speech to Text service
    Stt(SttCommand),
    /// Text to Speech service
    Tts(TtsCommand),
    /// Language Translator service
    Translate(TranslateCommand),
    /// Natural Language Understanding service
    Nlu(NluCommand),
    /// Assistant service
    Assistant(AssistantCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .with_target(false)
            .init();
    }

    // Both reqwest and tokio-tungstenite go through rustls.
    let _ = rustls::crypto::ring::default_provider().install_default();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli).await,
        Commands::Stt(cmd) => cmd.run(&cli).await,
        Commands::Tts(cmd) => cmd.run(&cli).await,
        Commands::Translate(cmd) => cmd.run(&cli).await,
        Commands::Nlu(cmd) => cmd.run(&cli).await,
        Commands::Assistant(cmd) => cmd.run(&cli).await,
    }
}
