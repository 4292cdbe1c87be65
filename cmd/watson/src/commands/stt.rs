//! Speech to Text commands.

use std::time::Duration;

use clap::{Args, Subcommand};
use cogkit_cli::audio_content_type;
use cogkit_watson::{
    CallbackFns, CloseOutcome, RecognizeOptions, RecognizeSessionConfig, SessionHandle,
    SessionSummary,
};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::debug;

use super::{create_client, format_bytes, get_context, load_request, output_result, print_verbose};
use crate::Cli;

/// Speech to Text service.
///
/// `recognize` sends a whole file in one request; `stream` paces it over a
/// WebSocket and prints results as they arrive.
#[derive(Args)]
pub struct SttCommand {
    #[command(subcommand)]
    command: SttSubcommand,
}

#[derive(Subcommand)]
enum SttSubcommand {
    /// List recognition models
    Models,
    /// Show one recognition model
    Model {
        /// Model ID, e.g. en-US_BroadbandModel
        id: String,
    },
    /// Recognize an audio file in one request
    Recognize(RecognizeArgs),
    /// Stream an audio file over WebSocket
    Stream(StreamArgs),
}

#[derive(Args)]
struct RecognizeArgs {
    /// Audio file path
    audio: String,
    /// Audio MIME type (default: guessed from the file extension)
    #[arg(long)]
    content_type: Option<String>,
    /// Recognition model
    #[arg(short = 'm', long)]
    model: Option<String>,
    /// Include word timestamps
    #[arg(long)]
    timestamps: bool,
    /// Label speakers
    #[arg(long)]
    speaker_labels: bool,
}

#[derive(Args)]
struct StreamArgs {
    #[command(flatten)]
    recognize: RecognizeArgs,
    /// Print interim hypotheses
    #[arg(long)]
    interim: bool,
    /// Audio frame size in bytes (default: 2000)
    #[arg(long)]
    chunk_size: Option<usize>,
    /// Delay between frames in milliseconds (default: 10)
    #[arg(long)]
    interval_ms: Option<u64>,
    /// Number of `listening` states before closing (default: 2)
    #[arg(long)]
    listening_threshold: Option<u32>,
}

/// Result of a streaming run, for output.
#[derive(Serialize)]
struct StreamResult {
    transcript: String,
    close_code: Option<u16>,
    close_reason: String,
    success: bool,
    audio_frames_sent: usize,
}

impl SttCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            SttSubcommand::Models => self.models(cli).await,
            SttSubcommand::Model { id } => self.model(cli, id).await,
            SttSubcommand::Recognize(args) => self.recognize(cli, args).await,
            SttSubcommand::Stream(args) => self.stream(cli, args).await,
        }
    }

    async fn models(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let models = client.speech_to_text().list_models().await?;
        output_result(cli, &models)
    }

    async fn model(&self, cli: &Cli, id: &str) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;
        let model = client.speech_to_text().get_model(id).await?;
        output_result(cli, &model)
    }

    async fn recognize(&self, cli: &Cli, args: &RecognizeArgs) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;

        let options = build_options(cli, args, &ctx.default_model)?;
        let audio = std::fs::read(&args.audio)?;
        print_verbose(
            cli,
            &format!("Recognizing {} ({})", args.audio, format_bytes(audio.len())),
        );

        let results = client.speech_to_text().recognize(audio, &options).await?;
        output_result(cli, &results)
    }

    async fn stream(&self, cli: &Cli, args: &StreamArgs) -> anyhow::Result<()> {
        let ctx = get_context(cli)?;
        let client = create_client(&ctx)?;

        let options = build_options(cli, &args.recognize, &ctx.default_model)?
            .interim_results(args.interim);
        let mut config = RecognizeSessionConfig::default();
        if let Some(chunk_size) = args.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(ms) = args.interval_ms {
            config.send_interval = Duration::from_millis(ms);
        }
        if let Some(threshold) = args.listening_threshold {
            config.listening_threshold = threshold;
        }
        let audio = std::fs::read(&args.recognize.audio)?;
        print_verbose(
            cli,
            &format!(
                "Streaming {} ({}) in {}-byte frames every {:?}",
                args.recognize.audio,
                format_bytes(audio.len()),
                config.chunk_size,
                config.send_interval
            ),
        );

        let session = client
            .speech_to_text()
            .recognize_using_websocket(audio, options, config)
            .await?;
        print_verbose(cli, &format!("Connecting to {}", session.url()));

        let callback = CallbackFns::new()
            .with_connected(|| debug!("Connected"))
            .with_error(|err| eprintln!("Error: {}", err))
            .with_interim_result(|alternatives| {
                if let Some(best) = alternatives.first() {
                    eprintln!("... {}", best.transcript.trim());
                }
            })
            .with_final_result(|text| eprintln!("> {}", text.trim()))
            .with_close(|outcome: &CloseOutcome| debug!("Closed: {}", outcome));

        let handle = session.start(callback, &Handle::current());
        let summary = join_or_interrupt(handle).await?;

        let result = StreamResult {
            success: summary.outcome.is_success(),
            close_code: summary.outcome.code,
            close_reason: summary.outcome.reason,
            transcript: summary.transcript.trim().to_string(),
            audio_frames_sent: summary.audio_frames_sent,
        };
        output_result(cli, &result)?;

        if !result.success {
            anyhow::bail!("session closed abnormally");
        }
        Ok(())
    }
}

/// Waits for the session to end, stopping it on Ctrl-C.
async fn join_or_interrupt(handle: SessionHandle) -> anyhow::Result<SessionSummary> {
    let stopper = handle.stop_handle();
    let join = handle.join();
    tokio::pin!(join);

    let summary = tokio::select! {
        res = &mut join => res?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Stopping...");
            stopper.stop();
            join.await?
        }
    };
    Ok(summary)
}

fn build_options(
    cli: &Cli,
    args: &RecognizeArgs,
    default_model: &str,
) -> anyhow::Result<RecognizeOptions> {
    let mut options: RecognizeOptions = load_request(cli)?.unwrap_or_default();

    let content_type = args
        .content_type
        .clone()
        .or_else(|| options.content_type.clone())
        .or_else(|| audio_content_type(&args.audio).map(str::to_string))
        .ok_or_else(|| {
            anyhow::anyhow!("cannot guess audio type of '{}', use --content-type", args.audio)
        })?;
    options.content_type = Some(content_type);

    if let Some(model) = &args.model {
        options.model = Some(model.clone());
    } else if options.model.is_none() && !default_model.is_empty() {
        options.model = Some(default_model.to_string());
    }
    if args.timestamps {
        options.timestamps = Some(true);
    }
    if args.speaker_labels {
        options.speaker_labels = Some(true);
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;
    use crate::Commands;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn recognize_args(cli: &Cli) -> &RecognizeArgs {
        match &cli.command {
            Commands::Stt(SttCommand {
                command: SttSubcommand::Recognize(args),
            }) => args,
            _ => panic!("not an stt recognize command"),
        }
    }

    #[test]
    fn test_request_file_model_beats_context_default() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"{"content-type":"audio/wav","model":"en-US_Multimedia"}"#)
            .unwrap();
        let path = file.path().to_str().unwrap();

        let cli = parse(&["watson", "-f", path, "stt", "recognize", "speech.flac"]);
        let options = build_options(&cli, recognize_args(&cli), "en-US_BroadbandModel").unwrap();
        assert_eq!(options.content_type.as_deref(), Some("audio/wav"));
        assert_eq!(options.model.as_deref(), Some("en-US_Multimedia"));

        let cli = parse(&[
            "watson", "-f", path, "stt", "recognize", "speech.flac", "-m", "fr-FR_Telephony",
        ]);
        let options = build_options(&cli, recognize_args(&cli), "en-US_BroadbandModel").unwrap();
        assert_eq!(options.model.as_deref(), Some("fr-FR_Telephony"));
    }

    #[test]
    fn test_context_default_model_and_guessed_type() {
        let cli = parse(&["watson", "stt", "recognize", "speech.flac", "--timestamps"]);
        let options = build_options(&cli, recognize_args(&cli), "en-US_BroadbandModel").unwrap();
        assert_eq!(options.content_type.as_deref(), Some("audio/flac"));
        assert_eq!(options.model.as_deref(), Some("en-US_BroadbandModel"));
        assert_eq!(options.timestamps, Some(true));

        let cli = parse(&["watson", "stt", "recognize", "speech.unknown"]);
        assert!(build_options(&cli, recognize_args(&cli), "").is_err());
    }
}
