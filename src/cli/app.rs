//! Main CLI application structure

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use super::output::{Output, OutputFormat};
use super::{item, list, plan, share};
use crate::storage::{Config, Project};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "BASKET_LOG";

#[derive(Parser)]
#[command(name = "basket")]
#[command(author, version, about = "Local-first shopping lists")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new basket project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage shopping lists
    #[command(subcommand)]
    List(list::ListCommands),

    /// Manage items within a list
    #[command(subcommand)]
    Item(item::ItemCommands),

    /// Share a list as text, optionally with a CSV attachment (Premium)
    Share {
        /// List ID or name
        list: String,

        /// Also write a CSV file to the export directory
        #[arg(long)]
        csv: bool,

        /// Record who the list is shared with (repeatable)
        #[arg(long = "with", value_name = "TARGET")]
        with: Vec<String>,

        /// Stop sharing the list and forget its targets
        #[arg(long, conflicts_with_all = ["csv", "with"])]
        stop: bool,
    },

    /// Suggest items from past usage
    Suggest {
        /// Part of an item name
        query: String,
    },

    /// Show or change the subscription plan
    #[command(subcommand)]
    Plan(plan::PlanCommands),
}

/// Installs the stderr subscriber; `verbose` overrides `BASKET_LOG`
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("basket_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be set when run() is called twice in-process
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()?.global.default_format.into(),
    };
    let output = Output::new(format);

    debug!(?format, "basket starting");

    match cli.command {
        Commands::Init { path } => {
            debug!(%path, "initializing project");
            let project = Project::init(&path)?;
            debug!(dir = %project.basket_dir().display(), "created .basket directory");
            output.success(&format!(
                "Initialized basket project at {}",
                project.root().display()
            ));
        }

        Commands::List(cmd) => list::run(cmd, &output)?,
        Commands::Item(cmd) => item::run(cmd, &output)?,

        Commands::Share {
            list,
            stop: true,
            ..
        } => share::stop(&output, &list)?,
        Commands::Share { list, csv, with, .. } => share::run(&output, &list, csv, &with)?,

        Commands::Suggest { query } => suggest(&output, &query)?,

        Commands::Plan(cmd) => plan::run(cmd, &output)?,
    }

    debug!("command completed");
    Ok(())
}

/// Ranks previously used items matching the query
fn suggest(output: &Output, query: &str) -> Result<()> {
    let project = Project::open_current()?;
    let repo = project.repository()?;

    let index = repo.suggestions();
    let matches = index.suggestions(query);
    debug!(query, matches = matches.len(), "suggestions");

    if output.is_json() {
        let items: Vec<_> = matches
            .iter()
            .map(|item| {
                serde_json::json!({
                    "name": item.name,
                    "category": item.category,
                    "unit": item.unit,
                    "price_per_unit": item.price_per_unit,
                    "usage_count": index.usage_count(&item.name).unwrap_or(0),
                })
            })
            .collect();
        output.data(&items);
    } else if matches.is_empty() {
        output.success("No suggestions.");
    } else {
        for item in &matches {
            let count = index.usage_count(&item.name).unwrap_or(0).to_string();
            output.row(&[&item.name, item.category.label(), &count]);
        }
    }

    Ok(())
}
