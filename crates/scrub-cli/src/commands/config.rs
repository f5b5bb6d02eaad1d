use anyhow::Result;
use scrub_config::Config;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::ConfigCommands;

pub fn handle(config_path: Option<&Path>, cmd: ConfigCommands) -> Result<ExitCode> {
    match cmd {
        ConfigCommands::Show => show(config_path)?,
        ConfigCommands::Path => {
            let path = config_path
                .map(Path::to_path_buf)
                .unwrap_or_else(Config::config_path);
            println!("{}", path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn show(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
