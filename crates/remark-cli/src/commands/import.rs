//! Import command
//!
//! Import comments from a Disqus XML export.

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use remark_core::migrator::Disqus;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use super::GlobalOpts;

/// Arguments for the import command
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Site ID to import into
    #[arg(long, short)]
    pub site: String,

    /// Disqus export file, `-` reads stdin
    #[arg(long, short)]
    pub file: PathBuf,

    /// Secret used for IP hashing (overrides [admin] secret)
    #[arg(long, env = "REMARK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

/// Execute the import command
pub fn execute(args: ImportArgs, opts: &GlobalOpts) -> Result<()> {
    use colored::Colorize;

    let mut config = opts.load_config()?;
    if let Some(secret) = args.secret {
        config.admin.secret = secret;
    }
    if config.admin.secret.is_empty() {
        bail!("No secret configured. Use --secret, REMARK_SECRET or [admin] secret");
    }

    let data_store = opts.data_store(&config)?;
    let importer = Disqus::new(data_store);

    let mut reader: Box<dyn BufRead> = if args.file.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.file)
            .with_context(|| format!("Failed to open {}", args.file.display()))?;
        Box::new(BufReader::new(file))
    };

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Importing into {}...", args.site));

    let result = importer.import_with_progress(reader.as_mut(), &args.site, &mut |count| {
        spinner.set_message(format!("{} comments imported", count));
    });
    spinner.finish_and_clear();

    let imported = result.with_context(|| format!("Import into site '{}' failed", args.site))?;
    println!(
        "{} Imported {} comments into site {}",
        "✓".green(),
        imported.to_string().yellow(),
        args.site.cyan()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ImportArgs,
    }

    #[test]
    fn test_import_args() {
        let cli = TestCli::try_parse_from([
            "import", "--site", "blog", "--file", "-", "--secret", "12345",
        ])
        .unwrap();
        assert_eq!(cli.args.site, "blog");
        assert_eq!(cli.args.file, PathBuf::from("-"));
        assert_eq!(cli.args.secret.as_deref(), Some("12345"));
    }

    #[test]
    fn test_import_requires_site() {
        assert!(TestCli::try_parse_from(["import", "--file", "export.xml"]).is_err());
    }
}
