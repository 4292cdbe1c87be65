//! Natural Language Understanding commands.

use clap::{Args, Subcommand};
use cogkit_watson::{AnalyzeRequest, Features};

use super::{create_client, get_context, load_request, output_result};
use crate::Cli;

/// Natural Language Understanding service.
#[derive(Args)]
pub struct NluCommand {
    #[command(subcommand)]
    command: NluSubcommand,
}

#[derive(Subcommand)]
enum NluSubcommand {
    /// Analyze text, HTML or a web page
    Analyze {
        /// Text to analyze
        text: Option<String>,
        /// Analyze the page at this URL instead
        #[arg(long, conflicts_with = "text")]
        url: Option<String>,
        /// Comma-separated features
        #[arg(long, default_value = "sentiment,keywords,entities")]
        features: String,
        /// Language of the content (default: detected)
        #[arg(long)]
        language: Option<String>,
    },
}

impl NluCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            NluSubcommand::Analyze {
                text,
                url,
                features,
                language,
            } => {
                let ctx = get_context(cli)?;
                let client = create_client(&ctx)?;

                let mut req: AnalyzeRequest = load_request(cli)?.unwrap_or_default();
                if text.is_some() || url.is_some() {
                    req.text = text.clone();
                    req.html = None;
                    req.url = url.clone();
                }
                if req.features.is_empty() {
                    req.features = Features::parse_list(features)?;
                }
                if language.is_some() {
                    req.language = language.clone();
                }

                let results = client.natural_language_understanding().analyze(&req).await?;
                output_result(cli, &results)
            }
        }
    }
}
