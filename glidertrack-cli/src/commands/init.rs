//! Init command - write the default configuration file.

use std::path::Path;

use glidertrack::config::{config_file_path, ConfigFile, TOKEN_ENV_VAR};

use crate::error::CliError;

/// Run the init command.
pub fn run(force: bool) -> Result<(), CliError> {
    let path = config_file_path();
    init_at(&path, force)?;

    println!("Created {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set 'token' under [telegram], or export {}", TOKEN_ENV_VAR);
    println!("  2. Run 'glidertrack run' and send /start_session to the bot");
    Ok(())
}

/// Write the default config to `path`. An existing file is only replaced
/// with `force`.
fn init_at(path: &Path, force: bool) -> Result<(), CliError> {
    if force {
        ConfigFile::default().save_to(path)?;
        return Ok(());
    }

    if ConfigFile::ensure_exists_at(path)? {
        Ok(())
    } else {
        Err(CliError::ConfigExists(path.to_path_buf()))
    }
}
