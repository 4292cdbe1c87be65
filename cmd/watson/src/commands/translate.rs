//! Language Translator commands.

use clap::{Args, Subcommand};
use cogkit_watson::TranslateRequest;

use super::{create_client, get_context, load_request, output_result};
use crate::Cli;

/// Language Translator service.
#[derive(Args)]
pub struct TranslateCommand {
    #[command(subcommand)]
    command: TranslateSubcommand,
}

#[derive(Subcommand)]
enum TranslateSubcommand {
    /// Translate text
    Text {
        /// Text to translate (or use -f request file)
        text: Vec<String>,
        /// Target language
        #[arg(long)]
        to: Option<String>,
        /// Source language (default: detected)
        #[arg(long)]
        from: Option<String>,
        /// Translation model ID, e.g. en-de
        #[arg(long)]
        model: Option<String>,
    },
    /// Identify the language of text
    Identify {
        /// Text to identify
        text: String,
    },
    /// List identifiable languages
    Languages,
    /// List translation models
    Models {
        /// Filter by source language
        #[arg(long)]
        source: Option<String>,
        /// Filter by target language
        #[arg(long)]
        target: Option<String>,
    },
}

impl TranslateCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let service = client.language_translator();

        match &self.command {
            TranslateSubcommand::Text {
                text,
                to,
                from,
                model,
            } => {
                let mut req: TranslateRequest = load_request(cli)?.unwrap_or_default();
                if !text.is_empty() {
                    req.text = text.clone();
                }
                if to.is_some() {
                    req.target = to.clone();
                }
                if from.is_some() {
                    req.source = from.clone();
                }
                if model.is_some() {
                    req.model_id = model.clone();
                }

                let result = service.translate(&req).await?;
                if cli.output.is_none() && !cli.json {
                    for t in &result.translations {
                        println!("{}", t.translation);
                    }
                    return Ok(());
                }
                output_result(cli, &result)
            }
            TranslateSubcommand::Identify { text } => {
                let result = service.identify(text).await?;
                output_result(cli, &result)
            }
            TranslateSubcommand::Languages => {
                let result = service.list_identifiable_languages().await?;
                output_result(cli, &result)
            }
            TranslateSubcommand::Models { source, target } => {
                let result = service
                    .list_models(source.as_deref(), target.as_deref())
                    .await?;
                output_result(cli, &result)
            }
        }
    }
}
