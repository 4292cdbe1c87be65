//! CLI commands module.

mod assistant;
mod config;
mod nlu;
mod stt;
mod translate;
mod tts;
mod util;

pub use assistant::AssistantCommand;
pub use config::ConfigCommand;
pub use nlu::NluCommand;
pub use stt::SttCommand;
pub use translate::TranslateCommand;
pub use tts::TtsCommand;

pub(crate) use util::*;
