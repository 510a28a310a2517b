/// JSON helpers for model output.
pub mod json;
/// TOML configuration.
pub mod toml_config;
