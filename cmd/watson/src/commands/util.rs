//! Utility functions for CLI commands.

use std::sync::Arc;
use std::time::Duration;

use cogkit_cli::config::{load_config, AuthType, Config, Context};
use cogkit_cli::{Output, OutputFormat};
use cogkit_watson::{
    Authenticator, BasicAuthenticator, BearerTokenAuthenticator, Client, ClientBuilder,
    NoAuthAuthenticator,
};
use tracing::debug;

use crate::Cli;

const APP_NAME: &str = "watson";

/// Service keys accepted in a context's `urls` map. `all` applies to every
/// service and is overridden by the specific keys.
pub const SERVICE_KEYS: [&str; 6] = ["all", "stt", "tts", "translator", "nlu", "assistant"];

/// Gets the global configuration.
pub fn get_config(cli: &Cli) -> anyhow::Result<Config> {
    load_config(APP_NAME, cli.config.as_deref())
}

/// Gets the context configuration to use.
pub fn get_context(cli: &Cli) -> anyhow::Result<Context> {
    let cfg = get_config(cli)?;

    match cfg.resolve_context(cli.context.as_deref()) {
        Some(ctx) => Ok(ctx.clone()),
        None => match cli.context.as_deref() {
            None => anyhow::bail!(
                "no context specified. Use -c flag or set a default context with 'watson config use-context'"
            ),
            Some(name) => anyhow::bail!("context '{}' not found", name),
        },
    }
}

/// Parses an auth type name.
pub fn parse_auth_type(s: &str) -> anyhow::Result<AuthType> {
    match s.to_lowercase().as_str() {
        "basic" | "apikey" => Ok(AuthType::Basic),
        "bearer" | "token" => Ok(AuthType::Bearer),
        "none" | "noauth" => Ok(AuthType::None),
        other => anyhow::bail!("unknown auth type '{}' (basic, bearer, none)", other),
    }
}

/// Parses a `service=url` pair.
pub fn parse_service_url(s: &str) -> anyhow::Result<(String, String)> {
    let (service, url) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("expected SERVICE=URL, got '{}'", s))?;
    if !SERVICE_KEYS.contains(&service) {
        anyhow::bail!(
            "unknown service '{}' (one of {})",
            service,
            SERVICE_KEYS.join(", ")
        );
    }
    Ok((service.to_string(), url.to_string()))
}

/// Creates a Watson client from context configuration.
pub fn create_client(ctx: &Context) -> anyhow::Result<Client> {
    let authenticator: Arc<dyn Authenticator> = match ctx.auth_type {
        AuthType::Basic => Arc::new(BasicAuthenticator::new(ctx.username(), &ctx.api_key)?),
        AuthType::Bearer => Arc::new(BearerTokenAuthenticator::new(&ctx.api_key)?),
        AuthType::None => Arc::new(NoAuthAuthenticator),
    };
    debug!("Using {:?} auth, urls: {:?}", ctx.auth_type, ctx.urls);

    let mut builder = ClientBuilder::new(authenticator);
    if let Some(url) = ctx.url("all") {
        builder = builder.service_url(url);
    }
    if let Some(url) = ctx.url("stt") {
        builder = builder.speech_to_text_url(url);
    }
    if let Some(url) = ctx.url("tts") {
        builder = builder.text_to_speech_url(url);
    }
    if let Some(url) = ctx.url("translator") {
        builder = builder.language_translator_url(url);
    }
    if let Some(url) = ctx.url("nlu") {
        builder = builder.natural_language_understanding_url(url);
    }
    if let Some(url) = ctx.url("assistant") {
        builder = builder.assistant_url(url);
    }
    if !ctx.version.is_empty() {
        builder = builder.version(&ctx.version);
    }
    if ctx.timeout > 0 {
        builder = builder.timeout(Duration::from_secs(ctx.timeout));
    }
    if ctx.disable_ssl_verification {
        builder = builder.disable_ssl_verification(true);
    }

    Ok(builder.build()?)
}

/// Loads the `-f` request file, if one was given.
pub fn load_request<T: serde::de::DeserializeOwned>(cli: &Cli) -> anyhow::Result<Option<T>> {
    match cli.input.as_deref() {
        Some(path) => Ok(Some(cogkit_cli::load_request(path)?)),
        None => Ok(None),
    }
}

/// Outputs result as JSON or YAML, to the `-o` file or stdout.
pub fn output_result<T: serde::Serialize>(cli: &Cli, result: &T) -> anyhow::Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Yaml
    };
    Output::new(format, cli.output.clone()).write(result)
}

/// Prints verbose output if enabled.
pub fn print_verbose(cli: &Cli, msg: &str) {
    cogkit_cli::print_verbose(cli.verbose, msg);
}

/// Prints success message.
pub fn print_success(msg: &str) {
    eprintln!("\x1b[32m✓\x1b[0m {}", msg);
}

/// Formats bytes to human readable string.
pub fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_service_url() {
        assert_eq!(
            parse_service_url("stt=https://stt.example.com").unwrap(),
            ("stt".to_string(), "https://stt.example.com".to_string())
        );
        assert!(parse_service_url("stt").is_err());
        assert!(parse_service_url("vision=https://x").is_err());
    }

    #[test]
    fn test_parse_auth_type() {
        assert_eq!(parse_auth_type("Bearer").unwrap(), AuthType::Bearer);
        assert_eq!(parse_auth_type("apikey").unwrap(), AuthType::Basic);
        assert!(parse_auth_type("iam").is_err());
    }

    #[test]
    fn test_create_client() {
        let mut ctx = Context {
            auth_type: AuthType::Bearer,
            api_key: "token".to_string(),
            ..Default::default()
        };
        ctx.urls
            .insert("all".to_string(), "http://127.0.0.1:9000".to_string());
        assert!(create_client(&ctx).is_ok());

        let missing_key = Context::default();
        assert!(create_client(&missing_key).is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
