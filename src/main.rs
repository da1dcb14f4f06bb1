//! scm-changelog - change logs from CVS, Subversion, Perforce, ClearCase,
//! StarTeam and Visual SourceSafe history
//!
//! Binary entry point.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use scm_changelog::changelog::{ChangeLog, ChangeLogConfig};
use scm_changelog::model::ChangeLogSet;
use scm_changelog::scm::LogSelection;

#[derive(Debug, Parser)]
#[command(name = "scm-changelog")]
#[command(about = "Generate an XML change log from SCM history", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./scm-changelog.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Repository connection, e.g. scm:svn:http://svn.example.org/repo
    #[arg(long)]
    connection: Option<String>,

    /// Backend type overriding the one named by the connection
    #[arg(long)]
    backend: Option<String>,

    /// Working directory for the SCM client
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// How markers are interpreted: range, date or tag
    #[arg(long = "type")]
    selection: Option<LogSelection>,

    /// Comma-delimited day counts
    #[arg(long)]
    range: Option<String>,

    /// Comma-delimited dates
    #[arg(long)]
    date: Option<String>,

    /// Comma-delimited tags
    #[arg(long)]
    tag: Option<String>,

    /// Java-style date pattern, e.g. yyyy-MM-dd
    #[arg(long)]
    date_format: Option<String>,

    /// ClearCase comment format
    #[arg(long)]
    comment_format: Option<String>,

    /// Where to write the XML document
    #[arg(long)]
    output: Option<PathBuf>,

    /// Load the output document instead of querying the SCM when it exists
    #[arg(long)]
    reuse_existing: bool,

    /// Parse a captured client log instead of running the client
    #[arg(long, value_name = "LOG_FILE")]
    replay: Option<PathBuf>,

    /// Log progress
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn load_config(&self) -> color_eyre::Result<ChangeLogConfig> {
        let path = self
            .config
            .clone()
            .or_else(|| ChangeLogConfig::find_config_file("."));
        let mut config = match path {
            Some(path) => ChangeLogConfig::load_from_file(path)?,
            None => ChangeLogConfig::default(),
        };

        if let Some(connection) = &self.connection {
            config.connection = connection.clone();
        }
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(selection) = self.selection {
            config.selection = selection;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        for (flag, field) in [
            (&self.backend, &mut config.backend),
            (&self.range, &mut config.range),
            (&self.date, &mut config.date),
            (&self.tag, &mut config.tag),
            (&self.date_format, &mut config.date_format),
            (&self.comment_format, &mut config.comment_format),
        ] {
            if flag.is_some() {
                field.clone_from(flag);
            }
        }
        Ok(config)
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let changelog = ChangeLog::new(cli.load_config()?);
    let sets = match &cli.replay {
        Some(log) => vec![changelog.replay(log)?],
        None => changelog.load_or_generate(cli.reuse_existing)?,
    };

    for set in &sets {
        print_summary(set);
    }
    if let Some(path) = changelog.write(&sets)? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_summary(set: &ChangeLogSet) {
    let files: usize = set.entries().iter().map(|e| e.files.len()).sum();
    println!(
        "{} .. {}: {} entries, {} files",
        if set.start().is_empty() { "beginning" } else { set.start() },
        set.end_display(),
        set.len(),
        files
    );
}
