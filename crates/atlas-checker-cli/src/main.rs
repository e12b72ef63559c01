use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use atlas_checker_core::{AtlasChecker, Config};

#[derive(Parser)]
#[command(name = "atlas-checker")]
#[command(about = "Check atlas label images for IDs missing from the reference catalog")]
#[command(version)]
struct Cli {
    /// Root directory for the recursive label directory search
    root_directory: PathBuf,

    /// Path to the atlas info CSV file
    #[arg(long, default_value = "./atlases/atlas_v3/atlas_info.csv")]
    csv_path: PathBuf,

    /// Output JSON file path (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print detailed progress information
    #[arg(short, long)]
    verbose: bool,

    /// Number of worker threads (0 = one per CPU)
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

fn main() -> Result<(), anyhow::Error> {
    // Initialize logger; warnings from the pipeline land on stderr
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Parse command line arguments
    let cli = Cli::parse();

    if cli.verbose {
        println!(
            "Starting scan from root directory: {}",
            cli.root_directory.display()
        );
        println!("Using CSV file: {}", cli.csv_path.display());
    }

    let config = Config {
        csv_path: cli.csv_path,
        threads: cli.threads,
    };

    // Catalog problems and an invalid root surface here as non-zero exits
    let checker = AtlasChecker::new(&config)?;
    let outcome = checker.run(&cli.root_directory)?;

    if cli.verbose {
        println!("\nFound {} matching directories", outcome.report.len());
    }

    if let Some(output) = cli.output {
        let json = serde_json::to_string_pretty(&outcome.report)?;
        fs::write(&output, json)
            .with_context(|| format!("failed to write report to {}", output.display()))?;
        println!("\nResults saved to: {}", output.display());
    } else {
        for (directory, missing) in &outcome.report.entries {
            if missing.is_empty() {
                continue;
            }
            println!("\nDirectory: {}", directory);
            println!("IDs present in images but missing from catalog: {:?}", missing);
        }
    }

    Ok(())
}
