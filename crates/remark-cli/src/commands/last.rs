//! Last command
//!
//! Show the most recent comments of a site.

use anyhow::{Context, Result};
use clap::Args;
use remark_core::comment::Comment;

use super::GlobalOpts;

/// Arguments for the last command
#[derive(Debug, Args)]
pub struct LastArgs {
    /// Site ID
    #[arg(long, short)]
    pub site: String,

    /// Maximum number of comments, 0 shows all
    #[arg(long, short, default_value_t = 10)]
    pub max: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the last command
pub fn execute(args: LastArgs, opts: &GlobalOpts) -> Result<()> {
    use colored::Colorize;

    let config = opts.load_config()?;
    let data_store = opts.data_store(&config)?;
    let comments = data_store
        .last(&args.site, args.max)
        .with_context(|| format!("Failed to read site '{}'", args.site))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&comments)?);
        return Ok(());
    }

    if comments.is_empty() {
        println!("No comments in site {}", args.site.cyan());
        return Ok(());
    }

    for comment in &comments {
        println!(
            "{} {} {}",
            comment.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
            comment.user.name.bold(),
            comment.locator.url.cyan()
        );
        println!("  {}", summary(comment, 80));
    }

    Ok(())
}

/// First line of the comment text, cut to `width` characters
fn summary(comment: &Comment, width: usize) -> String {
    let line = comment.text.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= width {
        return line.to_string();
    }
    let cut: String = line.chars().take(width).collect();
    format!("{}...", cut)
}
