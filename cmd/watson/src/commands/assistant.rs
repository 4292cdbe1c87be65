//! Assistant commands.

use clap::{Args, Subcommand};
use cogkit_watson::{MessageInput, MessageRequest};

use super::{create_client, get_context, load_request, output_result};
use crate::Cli;

/// Assistant service.
#[derive(Args)]
pub struct AssistantCommand {
    #[command(subcommand)]
    command: AssistantSubcommand,
}

#[derive(Subcommand)]
enum AssistantSubcommand {
    /// Send a message to a workspace
    Message {
        /// Workspace ID
        workspace_id: String,
        /// Message text (or use -f request file)
        text: Option<String>,
    },
    /// List workspaces
    Workspaces,
}

impl AssistantCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;

        match &self.command {
            AssistantSubcommand::Message { workspace_id, text } => {
                let mut req: MessageRequest = load_request(cli)?.unwrap_or_default();
                if let Some(text) = text {
                    req.input = Some(MessageInput { text: text.clone() });
                }
                if req.input.is_none() {
                    anyhow::bail!("message text is required, pass TEXT or use -f");
                }
                let response = client.assistant().message(workspace_id, &req).await?;
                if cli.output.is_none() && !cli.json {
                    for line in &response.output.text {
                        println!("{}", line);
                    }
                    return Ok(());
                }
                output_result(cli, &response)
            }
            AssistantSubcommand::Workspaces => {
                let workspaces = client.assistant().list_workspaces().await?;
                output_result(cli, &workspaces)
            }
        }
    }
}
