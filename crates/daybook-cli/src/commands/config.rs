//! Configuration management commands.

use clap::Subcommand;
use daybook_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to disk
    Init,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Init => {
            let config = Config::default();
            config.save()?;
            println!("default configuration written");
        }
    }
    Ok(())
}
