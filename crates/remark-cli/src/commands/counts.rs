//! Counts command
//!
//! Show comment counts for a list of posts.

use anyhow::Result;
use clap::Args;

use super::GlobalOpts;

/// Arguments for the counts command
#[derive(Debug, Args)]
pub struct CountsArgs {
    /// Site ID
    #[arg(long, short)]
    pub site: String,

    /// Post URLs
    #[arg(required = true, num_args = 1..)]
    pub urls: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute the counts command
pub fn execute(args: CountsArgs, opts: &GlobalOpts) -> Result<()> {
    use colored::Colorize;

    let config = opts.load_config()?;
    let data_store = opts.data_store(&config)?;
    let counts = data_store.counts(&args.site, &args.urls);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
        return Ok(());
    }

    // Posts that could not be counted are left out
    for post in &counts {
        println!("{:>6}  {}", post.count.to_string().yellow(), post.url);
    }
    let missing = args.urls.len() - counts.len();
    if missing > 0 {
        eprintln!("{} {} posts not found", "⚠".yellow(), missing);
    }

    Ok(())
}
