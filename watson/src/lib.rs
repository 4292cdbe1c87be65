//! Watson cloud AI services SDK for Rust.
//!
//! # Features
//!
//! - Speech to Text: models, one-shot recognition and streaming recognition
//!   over WebSocket
//! - Text to Speech: voices and synthesis
//! - Language Translator: translation and language identification
//! - Natural Language Understanding: text analysis
//! - Assistant: dialog messages and workspaces
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use cogkit_watson::{BasicAuthenticator, CallbackFns, Client, RecognizeOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::builder(BasicAuthenticator::new("apikey", "your-api-key")?)
//!         .speech_to_text_url("https://api.us-south.speech-to-text.watson.cloud.ibm.com")
//!         .build()?;
//!
//!     let audio = std::fs::read("speech.flac")?;
//!     let session = client
//!         .speech_to_text()
//!         .recognize_using_websocket(
//!             audio,
//!             RecognizeOptions::new("audio/flac").interim_results(true),
//!             Default::default(),
//!         )
//!         .await?;
//!
//!     let callback = CallbackFns::new()
//!         .with_interim_result(|alts| println!("... {}", alts[0].transcript))
//!         .with_final_result(|text| println!("{}", text));
//!
//!     let summary = session
//!         .start(callback, &tokio::runtime::Handle::current())
//!         .join()
//!         .await?;
//!     println!("closed with {}", summary.outcome);
//!     Ok(())
//! }
//! ```
//!
//! # Authentication
//!
//! Credentials are attached by an [`Authenticator`]:
//!
//! 1. API key, sent as basic auth with user `apikey`:
//! ```rust,no_run
//! # use cogkit_watson::BasicAuthenticator;
//! let auth = BasicAuthenticator::new("apikey", "your-api-key")?;
//! # Ok::<(), cogkit_watson::Error>(())
//! ```
//!
//! 2. Bearer token obtained elsewhere:
//! ```rust,no_run
//! # use cogkit_watson::BearerTokenAuthenticator;
//! let auth = BearerTokenAuthenticator::new("your-token")?;
//! # Ok::<(), cogkit_watson::Error>(())
//! ```

mod assistant;
mod auth;
mod client;
mod error;
pub mod http;
mod nlu;
pub mod recognize;
mod stt;
mod translator;
mod tts;

pub use assistant::{
    AssistantService, MessageInput, MessageRequest, MessageResponse, OutputData, RuntimeIntent,
    Workspace, WorkspaceCollection,
};
pub use auth::{Authenticator, BasicAuthenticator, BearerTokenAuthenticator, NoAuthAuthenticator};
pub use client::{
    Client, ClientBuilder, DEFAULT_ASSISTANT_URL, DEFAULT_LANGUAGE_TRANSLATOR_URL,
    DEFAULT_NATURAL_LANGUAGE_UNDERSTANDING_URL, DEFAULT_SPEECH_TO_TEXT_URL,
    DEFAULT_TEXT_TO_SPEECH_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, VERSION_ASSISTANT,
    VERSION_LANGUAGE_TRANSLATOR, VERSION_NATURAL_LANGUAGE_UNDERSTANDING,
};
pub use error::{status_code, Error, Result};
pub use nlu::{
    AnalysisResults, AnalyzeRequest, CategoriesOptions, Features, LimitOptions,
    NaturalLanguageUnderstandingService, TargetedOptions,
};
pub use recognize::{
    CallbackFns, CloseOutcome, RecognizeCallback, RecognizeOptions, RecognizeSession,
    RecognizeSessionConfig, SessionHandle, SessionState, SessionSummary, StopHandle,
    SpeechRecognitionAlternative,
};
pub use stt::{SpeechModel, SpeechModels, SpeechRecognitionResults, SpeechToTextService, SupportedFeatures};
pub use translator::{
    IdentifiableLanguage, IdentifiableLanguages, IdentifiedLanguage, IdentifiedLanguages,
    LanguageTranslatorService, TranslateRequest, Translation, TranslationModel, TranslationModels,
    TranslationResult,
};
pub use tts::{SynthesizeRequest, TextToSpeechService, Voice, Voices, DEFAULT_ACCEPT, DEFAULT_VOICE};
