//! Config command handler.

use roster::{Result, RosterConfig};

/// Prints the resolved configuration as TOML.
pub fn cmd_config(config: &RosterConfig) -> Result<()> {
    match RosterConfig::default_path() {
        Some(path) if path.exists() => println!("# Default config file: {}", path.display()),
        Some(path) => println!("# Default config file: {} (not found)", path.display()),
        None => println!("# Default config file: (unavailable)"),
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
