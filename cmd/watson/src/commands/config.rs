//! Configuration commands.

use std::collections::BTreeMap;

use clap::{Args, Subcommand};
use cogkit_cli::config::{mask_api_key, Context};

use super::{get_config, output_result, parse_auth_type, parse_service_url, print_success};
use crate::Cli;

/// Manage CLI configuration.
///
/// Configuration is stored in ~/.cogkit/watson/config.yaml
/// Each context holds the credentials and service URLs of one account.
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    /// Add or update a context
    #[command(name = "add-context")]
    AddContext {
        /// Context name
        name: String,
        /// API key, basic auth password or bearer token
        #[arg(long)]
        api_key: Option<String>,
        /// Authentication type: basic, bearer or none
        #[arg(long, default_value = "basic")]
        auth_type: String,
        /// Basic auth username (default: apikey)
        #[arg(long)]
        username: Option<String>,
        /// Service URL as SERVICE=URL (all, stt, tts, translator, nlu, assistant)
        #[arg(long = "url", value_name = "SERVICE=URL")]
        urls: Vec<String>,
        /// API version date for versioned services, e.g. 2018-05-01
        #[arg(long)]
        api_version: Option<String>,
        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Skip TLS certificate verification
        #[arg(long)]
        disable_ssl_verification: bool,
        /// Default synthesis voice
        #[arg(long)]
        default_voice: Option<String>,
        /// Default recognition model
        #[arg(long)]
        default_model: Option<String>,
    },
    /// Delete a context
    #[command(name = "delete-context")]
    DeleteContext {
        /// Context name
        name: String,
    },
    /// Set the current context
    #[command(name = "use-context")]
    UseContext {
        /// Context name
        name: String,
    },
    /// Show the current context name
    #[command(name = "get-context")]
    GetContext,
    /// List all contexts
    #[command(name = "list-contexts", alias = "get-contexts")]
    ListContexts,
    /// View a context's configuration
    View {
        /// Context name (default: current)
        name: Option<String>,
    },
}

impl ConfigCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            ConfigSubcommand::AddContext {
                name,
                api_key,
                auth_type,
                username,
                urls,
                api_version,
                timeout,
                disable_ssl_verification,
                default_voice,
                default_model,
            } => {
                let auth_type = parse_auth_type(auth_type)?;
                let urls = urls
                    .iter()
                    .map(|s| parse_service_url(s))
                    .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

                let ctx = Context {
                    auth_type,
                    username: username.clone().unwrap_or_default(),
                    api_key: api_key.clone().unwrap_or_default(),
                    urls,
                    version: api_version.clone().unwrap_or_default(),
                    timeout: timeout.unwrap_or_default(),
                    disable_ssl_verification: *disable_ssl_verification,
                    default_voice: default_voice.clone().unwrap_or_default(),
                    default_model: default_model.clone().unwrap_or_default(),
                    ..Default::default()
                };

                let mut cfg = get_config(cli)?;
                cfg.add_context(name, ctx)?;
                print_success(&format!("Context '{}' added", name));
                if cfg.current_context == *name {
                    println!("Current context: {}", name);
                }
                Ok(())
            }
            ConfigSubcommand::DeleteContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.delete_context(name)?;
                print_success(&format!("Context '{}' deleted", name));
                Ok(())
            }
            ConfigSubcommand::UseContext { name } => {
                let mut cfg = get_config(cli)?;
                cfg.use_context(name)?;
                print_success(&format!("Switched to context '{}'", name));
                Ok(())
            }
            ConfigSubcommand::GetContext => {
                let cfg = get_config(cli)?;
                if cfg.current_context.is_empty() {
                    println!("No current context set");
                } else {
                    println!("{}", cfg.current_context);
                }
                Ok(())
            }
            ConfigSubcommand::ListContexts => {
                let cfg = get_config(cli)?;
                if cfg.contexts.is_empty() {
                    println!("No contexts configured");
                    return Ok(());
                }

                println!("{:<10} {:<20} {:<8} {:<20} STT URL", "CURRENT", "NAME", "AUTH", "API KEY");
                for name in cfg.list_contexts() {
                    let Some(ctx) = cfg.get_context(name) else {
                        continue;
                    };
                    let current = if name == cfg.current_context { "*" } else { "" };
                    let auth = format!("{:?}", ctx.auth_type).to_lowercase();
                    let stt = ctx.url("stt").or_else(|| ctx.url("all")).unwrap_or("-");
                    println!(
                        "{:<10} {:<20} {:<8} {:<20} {}",
                        current,
                        name,
                        auth,
                        mask_api_key(&ctx.api_key),
                        stt
                    );
                }
                Ok(())
            }
            ConfigSubcommand::View { name } => {
                let cfg = get_config(cli)?;
                let ctx = cfg
                    .resolve_context(name.as_deref())
                    .ok_or_else(|| anyhow::anyhow!("context not found"))?;
                output_result(cli, &ctx.masked())
            }
        }
    }
}
