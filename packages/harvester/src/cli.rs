//! Command-line interface for the harvester.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::catalog::download_catalog;
use crate::config::{validate_location, CONTROL_DOCUMENT_URL, DEFAULT_OUTPUT_FILE};
use crate::error::Result;
use crate::harvester::{catalog_location, now_epoch};
use crate::http::create_client;
use crate::json::save_json;
use crate::mirror::resolve_mirror;

/// Mediathek Harvester - Build a broadcast list from the MediathekView catalog.
#[derive(Parser)]
#[command(name = "mediathek-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the best mirror, parse its catalog and save it as JSON.
    Harvest {
        /// Control document listing the catalog mirrors
        #[arg(long, env = "MEDIATHEK_CONTROL_URL", default_value = CONTROL_DOCUMENT_URL)]
        control_url: String,

        /// Catalog URL or file to parse instead of the resolved mirror
        #[arg(long)]
        catalog: Option<String>,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
    },

    /// Print the catalog URL of the best mirror.
    Resolve {
        /// Control document listing the catalog mirrors
        #[arg(long, env = "MEDIATHEK_CONTROL_URL", default_value = CONTROL_DOCUMENT_URL)]
        control_url: String,
    },

    /// Parse a catalog from a URL or file and save it as JSON.
    Parse {
        /// Catalog URL or file (`.bz2` and `.gz` are decompressed)
        location: String,

        /// Output file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Harvest {
            control_url,
            catalog,
            output,
        } => harvest_command(&control_url, catalog.as_deref(), &output),
        Commands::Resolve { control_url } => resolve_command(&control_url),
        Commands::Parse { location, output } => parse_command(&location, &output),
    }
}

/// Create the progress spinner shared by all commands.
fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Execute the harvest command.
fn harvest_command(control_url: &str, catalog: Option<&str>, output: &Path) -> Result<()> {
    let client = create_client()?;

    let pb = spinner();
    pb.set_message("Resolving catalog mirror...");
    let location = match catalog_location(&client, control_url, catalog) {
        Ok(location) => location,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_and_clear();

    fetch_and_save(&client, &location, output)
}

/// Execute the resolve command.
fn resolve_command(control_url: &str) -> Result<()> {
    validate_location(control_url)?;
    let client = create_client()?;

    let pb = spinner();
    pb.set_message("Resolving catalog mirror...");
    let url = resolve_mirror(&client, control_url);
    pb.finish_and_clear();

    println!("{}", url?);
    Ok(())
}

/// Execute the parse command.
fn parse_command(location: &str, output: &Path) -> Result<()> {
    validate_location(location)?;
    let client = create_client()?;
    fetch_and_save(&client, location, output)
}

/// Parse a catalog and write the retained broadcasts.
fn fetch_and_save(client: &Client, location: &str, output: &Path) -> Result<()> {
    println!("{} {} ...", style("Fetching").bold(), style(location).cyan());

    let pb = spinner();
    pb.set_message("Parsing catalog...");

    let liste = match download_catalog(client, location, now_epoch()) {
        Ok(liste) => liste,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving JSON...");

    let output_path = match save_json(&liste, output) {
        Ok(path) => path,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    if liste.dropped() > 0 {
        println!(
            "  Dropped: {} of {} entries",
            style(liste.dropped()).yellow().bold(),
            liste.seen()
        );
    }
    println!(
        "{} broadcasts saved to {}",
        style(liste.len()).green().bold(),
        output_path.display()
    );

    Ok(())
}
