//! CLI support for cogkit tools.
//!
//! Context-based configuration, result output and request file loading
//! shared by the command-line front ends.

pub mod config;
pub mod output;
pub mod request;

pub use config::{load_config, mask_api_key, AuthType, Config, Context};
pub use output::{audio_content_type, guess_extension, print_verbose, Output, OutputFormat};
pub use request::{load_request, parse_request, RequestError};
