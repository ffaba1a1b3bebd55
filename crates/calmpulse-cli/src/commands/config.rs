use clap::Subcommand;
use std::path::Path;

use calmpulse_core::AppConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value (e.g. "advisory_endpoint", "tick_interval_ms")
    Get { key: String },
    /// Change one value and save the file
    Set { key: String, value: String },
    /// Print every key and value
    List {
        /// Print the whole file as JSON
        #[arg(long)]
        json: bool,
    },
    /// Overwrite the file with the defaults
    Reset,
    /// Print where the config file lives
    Path,
}

pub fn run(action: ConfigAction, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Path => println!("{}", path.display()),
        ConfigAction::Reset => {
            AppConfig::default().save_to(path)?;
            println!("{} reset to defaults", path.display());
        }
        action => {
            let mut config = AppConfig::load_from(path)?;
            if apply(action, &mut config)? {
                config.save_to(path)?;
            }
        }
    }
    Ok(())
}

/// Run a read or edit against a loaded config. Returns whether it changed.
fn apply(action: ConfigAction, config: &mut AppConfig) -> Result<bool, Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = config.get(&key).ok_or_else(|| {
                let known: Vec<String> = config.entries().into_iter().map(|(k, _)| k).collect();
                format!("unknown key: {key} (known: {})", known.join(", "))
            })?;
            println!("{value}");
            Ok(false)
        }
        ConfigAction::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
            Ok(true)
        }
        ConfigAction::List { json: true } => {
            println!("{}", serde_json::to_string_pretty(config)?);
            Ok(false)
        }
        ConfigAction::List { json: false } => {
            for (key, value) in config.entries() {
                println!("{key} = {value}");
            }
            Ok(false)
        }
        ConfigAction::Reset | ConfigAction::Path => Ok(false),
    }
}
