//! Subcommand implementations behind the `mlw` binary.

pub mod check;
pub mod status;
pub mod test_channel;

use std::path::Path;

use crate::core::config::Config;
use crate::core::errors::{Result, WardenError};

/// Write a default config file, refusing to clobber an existing one.
pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(WardenError::InvalidConfig {
            details: format!("refusing to overwrite existing config at {}", path.display()),
        });
    }
    let rendered = Config::default().to_toml()?;
    std::fs::write(path, rendered).map_err(|source| WardenError::io(path, source))?;
    println!("wrote default config to {}", path.display());
    Ok(())
}
