//! Config command
//!
//! Manage remark configuration.

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use remark_core::config::Config;
use std::fs;

use super::GlobalOpts;

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, opts: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(opts, json),
        ConfigCommand::Init { force } => init_config(opts, force),
    }
}

fn show_config(opts: &GlobalOpts, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let mut shown = opts.load_config()?;
    if !shown.admin.secret.is_empty() {
        shown.admin.secret = "********".to_string();
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    if opts.config_path.exists() {
        println!("{}", opts.config_path.display().to_string().dimmed());
    } else {
        println!(
            "{}",
            format!("{} not found, using defaults", opts.config_path.display()).dimmed()
        );
    }
    println!();
    println!("{}", shown.to_toml()?);

    Ok(())
}

fn init_config(opts: &GlobalOpts, force: bool) -> Result<()> {
    use colored::Colorize;

    let config_path = &opts.config_path;
    if config_path.exists() && !force {
        bail!(
            "{} already exists. Use --force to overwrite",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = format!("# remark configuration\n\n{}", Config::default().to_toml()?);
    fs::write(config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Configuration written to {}",
        "✓".green(),
        config_path.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn opts(dir: &std::path::Path) -> GlobalOpts {
        GlobalOpts {
            config_path: dir.join("conf").join("remark.toml"),
            storage_dir: None,
        }
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let temp = tempfile::tempdir().unwrap();
        let opts = opts(temp.path());
        init_config(&opts, false).unwrap();

        let config = Config::load(&opts.config_path).unwrap();
        assert_eq!(config.service.edit_duration_secs, 300);
        assert_eq!(config.storage.path, None::<PathBuf>);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let opts = opts(temp.path());
        init_config(&opts, false).unwrap();
        assert!(init_config(&opts, false).is_err());
        assert!(init_config(&opts, true).is_ok());
    }
}
