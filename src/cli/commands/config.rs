//! `treeloom config`
//!
//! Inspect and initialize configuration files.

use console::style;

use crate::config::ConfigLoader;
use crate::types::Result;

pub fn show(as_json: bool) -> Result<()> {
    ConfigLoader::show_config(as_json)
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    println!(
        "{}",
        style(format!("Created config at {}", path.display())).green()
    );
    Ok(())
}
