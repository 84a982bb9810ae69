// SPDX-License-Identifier: MIT

//! TCG Renamer CLI
//!
//! Batch-identifies trading-card scans under `Magic`, `Pokemon`, and
//! `Lorcana` folders and sorts them into `Processed`/`Error`, with an
//! opt-in reprocessing pass over accumulated `Error` contents at the end.

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

use tcg_renamer::pipeline::{self, GameKind, RunReport};
use tcg_renamer::recognize::ocr::OcrAdapter;
use tcg_renamer::recognize::vision::{VisionAdapter, VisionTextExtractor};
use tcg_renamer::recognize::RecognitionAdapter;
use tcg_renamer::Config;

/// TCG Renamer - trading-card scan identifier and sorter
#[derive(Parser, Debug)]
#[command(name = "tcg-renamer")]
#[command(version = "1.0.0")]
#[command(about = "Identify trading-card scans and sort them into Processed/Error", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tcg.cfg")]
    config: PathBuf,

    /// Directory holding the Magic/Pokemon/Lorcana folders
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long)]
    trace: bool,

    /// Suppress per-file progress output; log warnings and errors only
    #[arg(short, long)]
    quiet: bool,

    /// Answer prompts affirmatively (non-interactive runs)
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("TCG Renamer v1.0.0 starting up...");
    if !cli.quiet {
        println!("Script is starting up...");
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{}. Exiting...", e);
            if !cli.yes {
                pause("Press Enter to exit...");
            }
            std::process::exit(1);
        }
    };

    run(&cli, &config).await;

    info!("Processing complete. Exiting gracefully.");
    if !cli.yes {
        pause("Processing complete. Press Enter to exit.");
    }
}

async fn run(cli: &Cli, config: &Config) {
    let mut report = RunReport::default();
    let mut no_new_files = true;

    for game in GameKind::ALL {
        let root = cli.root.join(game.folder());
        if !root.exists() {
            continue;
        }

        let adapter: Box<dyn RecognitionAdapter> = match game {
            GameKind::Magic => {
                info!("Magic folder detected. Running OCR lookup pass.");
                Box::new(OcrAdapter::new(
                    Box::new(VisionTextExtractor::new(config)),
                    config,
                ))
            }
            GameKind::Pokemon | GameKind::Lorcana => {
                info!("{} folder detected. Running vision-model pass.", game.folder());
                Box::new(VisionAdapter::new(config, game.expertise()))
            }
        };

        if let Err(e) = pipeline::preprocess_file_names(&root) {
            error!("Preprocessing {:?} failed: {}", root, e);
        }

        no_new_files &=
            pipeline::process_game_root(&root, game, adapter.as_ref(), &mut report, cli.quiet)
                .await;
    }

    print_summary(&report);
    if no_new_files {
        if !cli.quiet {
            println!("No new files found.");
        }
        info!("No new files found.");
    }

    if report.errors > 0 && !cli.yes {
        let answer = pause(
            "TCG Renamer detected files in your Error folders.\n\
             Would you like to re-check these files? (Y/N): ",
        );
        if matches!(answer.trim().to_lowercase().as_str(), "n" | "no") {
            println!("Exiting gracefully.");
            info!("Exiting gracefully.");
            return;
        }
    }

    info!("Reprocessing error files...");
    if !cli.quiet {
        println!("Reprocessing error files...");
    }

    // Reprocessing always goes through the vision model, Magic included.
    let fallback = VisionAdapter::new(config, "TCG expert");
    for game in GameKind::ALL {
        let root = cli.root.join(game.folder());
        if root.exists() {
            pipeline::reprocess_errors(&root, &fallback, &mut report, cli.quiet).await;
        }
    }

    println!("Total fixed files: {}", report.fixed);
    info!("Total fixed files: {}", report.fixed);
}

fn print_summary(report: &RunReport) {
    println!("Total Magic files processed: {}", report.magic_processed);
    println!("Total Pokemon files processed: {}", report.pokemon_processed);
    println!("Total Lorcana files processed: {}", report.lorcana_processed);
    println!("Errors during processing: {}", report.errors);

    info!("Total Magic files processed: {}", report.magic_processed);
    info!("Total Pokemon files processed: {}", report.pokemon_processed);
    info!("Total Lorcana files processed: {}", report.lorcana_processed);
    info!("Errors during processing: {}", report.errors);
}

fn pause(message: &str) -> String {
    print!("{message}");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["tcg-renamer"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("tcg.cfg"));
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.yes);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let cli = Cli::try_parse_from(["tcg-renamer", "--quiet"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "tcg-renamer",
            "--config",
            "/etc/tcg.cfg",
            "--root",
            "/scans",
            "--yes",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/tcg.cfg"));
        assert_eq!(cli.root, PathBuf::from("/scans"));
        assert!(cli.yes);
    }
}
