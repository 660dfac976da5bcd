// crates/warden-cli/src/commands/show_config.rs
//
// `warden config`: print the effective configuration after defaults.

use crate::config::WardenConfig;
use crate::output::{format_json, OutputFormat};

/// Run the config command.
pub fn run(config: &WardenConfig, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", format_json(config)),
        OutputFormat::Table => print!("{}", toml::to_string_pretty(config)?),
    }
    Ok(())
}
