//! Text to Speech commands.

use clap::{Args, Subcommand};
use cogkit_cli::guess_extension;
use cogkit_watson::{SynthesizeRequest, DEFAULT_ACCEPT};

use super::{
    create_client, format_bytes, get_context, load_request, output_result, print_success,
    print_verbose,
};
use crate::Cli;

/// Text to Speech service.
#[derive(Args)]
pub struct TtsCommand {
    #[command(subcommand)]
    command: TtsSubcommand,
}

#[derive(Subcommand)]
enum TtsSubcommand {
    /// List voices
    Voices,
    /// Show one voice
    Voice {
        /// Voice name, e.g. en-US_MichaelV3Voice
        name: String,
    },
    /// Synthesize text to an audio file
    ///
    /// Writes to the -o file, or output.<ext> by the audio format.
    Synthesize {
        /// Text to synthesize (or use -f request file)
        #[arg(short = 't', long)]
        text: Option<String>,
        /// Voice name
        #[arg(long)]
        voice: Option<String>,
        /// Audio format, e.g. audio/wav or audio/ogg;codecs=opus
        #[arg(long)]
        accept: Option<String>,
    },
}

impl TtsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            TtsSubcommand::Voices => {
                let ctx = get_context(cli)?;
                let client = create_client(&ctx)?;
                let voices = client.text_to_speech().list_voices().await?;
                output_result(cli, &voices)
            }
            TtsSubcommand::Voice { name } => {
                let ctx = get_context(cli)?;
                let client = create_client(&ctx)?;
                let voice = client.text_to_speech().get_voice(name).await?;
                output_result(cli, &voice)
            }
            TtsSubcommand::Synthesize {
                text,
                voice,
                accept,
            } => {
                let ctx = get_context(cli)?;
                let client = create_client(&ctx)?;

                let mut req: SynthesizeRequest = match load_request(cli)? {
                    Some(req) => req,
                    None => SynthesizeRequest::default(),
                };
                if let Some(text) = text {
                    req.text = text.clone();
                }
                if req.text.is_empty() {
                    anyhow::bail!("text is required, use -t or -f");
                }
                if let Some(voice) = voice {
                    req.voice = Some(voice.clone());
                } else if req.voice.is_none() && !ctx.default_voice.is_empty() {
                    req.voice = Some(ctx.default_voice.clone());
                }
                if let Some(accept) = accept {
                    req.accept = Some(accept.clone());
                }

                let format = req.accept.clone().unwrap_or_else(|| DEFAULT_ACCEPT.to_string());
                let path = cli
                    .output
                    .clone()
                    .unwrap_or_else(|| format!("output.{}", guess_extension(&format)));

                print_verbose(cli, &format!("Synthesizing {} chars as {}", req.text.len(), format));
                let audio = client.text_to_speech().synthesize(&req).await?;
                std::fs::write(&path, &audio)?;
                print_success(&format!("Saved {} to {}", format_bytes(audio.len()), path));
                Ok(())
            }
        }
    }
}
