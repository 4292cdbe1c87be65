//! Streams an audio file to Speech to Text and prints the results.
//!
//! ```sh
//! WATSON_API_KEY=... WATSON_STT_URL=https://api.us-south.speech-to-text.watson.cloud.ibm.com \
//!     cargo run -p cogkit-watson --example recognize_stream -- speech.flac audio/flac
//! ```

use cogkit_watson::{BasicAuthenticator, CallbackFns, Client, RecognizeOptions, DEFAULT_SPEECH_TO_TEXT_URL};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let mut args = std::env::args().skip(1);
    let path = args.next().ok_or("usage: recognize_stream <audio-file> [content-type]")?;
    let content_type = args.next().unwrap_or_else(|| "audio/wav".to_string());

    let api_key = std::env::var("WATSON_API_KEY")?;
    let url = std::env::var("WATSON_STT_URL").unwrap_or_else(|_| DEFAULT_SPEECH_TO_TEXT_URL.to_string());

    let client = Client::builder(BasicAuthenticator::new("apikey", api_key)?)
        .speech_to_text_url(url)
        .build()?;

    let audio = tokio::fs::read(&path).await?;
    println!("Streaming {} ({} bytes)", path, audio.len());

    let session = client
        .speech_to_text()
        .recognize_using_websocket(
            audio,
            RecognizeOptions::new(content_type).interim_results(true),
            Default::default(),
        )
        .await?;

    let callback = CallbackFns::new()
        .with_connected(|| println!("Connected"))
        .with_interim_result(|alts| {
            if let Some(alt) = alts.first() {
                println!("  ... {}", alt.transcript);
            }
        })
        .with_final_result(|text| println!("  >>> {}", text))
        .with_error(|err| eprintln!("Error: {}", err))
        .with_close(|outcome| println!("Closed: {}", outcome));

    let summary = session
        .start(callback, &tokio::runtime::Handle::current())
        .join()
        .await?;

    println!();
    println!("Transcript: {}", summary.transcript.trim());
    println!("Audio frames: {}", summary.audio_frames_sent);
    Ok(())
}
