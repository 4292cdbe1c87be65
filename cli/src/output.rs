//! Output utilities for CLI tools.

use std::path::Path;

use serde::Serialize;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

/// Where and how results are printed.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    /// Creates a new output configuration.
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// Renders `value` in the configured format.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Writes `value` to the output file, or stdout.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => std::fs::write(path, output)?,
            None => println!("{}", output.trim_end()),
        }
        Ok(())
    }

    /// Writes binary data to `path`.
    pub fn write_binary(&self, data: &[u8], path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path, data)?;
        Ok(())
    }
}

/// Prints verbose output if enabled.
pub fn print_verbose(enabled: bool, message: &str) {
    if enabled {
        eprintln!("[verbose] {}", message);
    }
}

/// Guesses the audio MIME type of a file from its extension.
pub fn audio_content_type(path: impl AsRef<Path>) -> Option<&'static str> {
    let ext = path.as_ref().extension()?.to_str()?.to_lowercase();
    Some(match ext.as_str() {
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        "mp3" => "audio/mp3",
        "ogg" | "opus" => "audio/ogg",
        "webm" => "audio/webm",
        "pcm" | "raw" => "audio/l16;rate=16000",
        _ => return None,
    })
}

/// Guesses the output file extension of an audio MIME type.
pub fn guess_extension(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    match mime.as_str() {
        "audio/mp3" | "audio/mpeg" => "mp3",
        "audio/wav" => "wav",
        "audio/flac" => "flac",
        "audio/ogg" => "ogg",
        "audio/webm" => "webm",
        "audio/l16" | "audio/basic" | "audio/mulaw" | "audio/alaw" => "pcm",
        _ => "bin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_content_type() {
        assert_eq!(audio_content_type("a/b/speech.FLAC"), Some("audio/flac"));
        assert_eq!(audio_content_type("speech.pcm"), Some("audio/l16;rate=16000"));
        assert_eq!(audio_content_type("notes.txt"), None);
        assert_eq!(audio_content_type("noext"), None);
    }

    #[test]
    fn test_guess_extension() {
        assert_eq!(guess_extension("audio/ogg;codecs=opus"), "ogg");
        assert_eq!(guess_extension("audio/l16; rate=22050"), "pcm");
        assert_eq!(guess_extension("audio/mpeg"), "mp3");
        assert_eq!(guess_extension("application/octet-stream"), "bin");
    }

    #[test]
    fn test_render() {
        #[derive(Serialize)]
        struct Row {
            name: &'static str,
        }
        let yaml = Output::new(OutputFormat::Yaml, None).render(&Row { name: "x" }).unwrap();
        assert_eq!(yaml.trim(), "name: x");
        let json = Output::new(OutputFormat::Json, None).render(&Row { name: "x" }).unwrap();
        assert_eq!(json, "{\n  \"name\": \"x\"\n}");
    }
}
