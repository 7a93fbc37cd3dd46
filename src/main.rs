mod error;
mod loader;
mod pipeline;
mod report;
mod rules;
mod segment;

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use report::{DashboardEntry, Report, SUGGESTED_FILENAME};

#[derive(Parser)]
#[command(name = "seo_audit", about = "Classify a crawl export against a fixed SEO checklist")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the audit and write the multi-sheet workbook
    Audit {
        /// Crawl export CSV (Screaming Frog "Internal" format)
        input: PathBuf,
        /// Where to write the workbook
        #[arg(short, long, default_value = SUGGESTED_FILENAME)]
        output: PathBuf,
        /// Print the dashboard as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the checklist and print the dashboard without writing a file
    Summary {
        /// Crawl export CSV
        input: PathBuf,
        /// Print the dashboard as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Audit {
            input,
            output,
            json,
        } => {
            let report = audit_file(&input)?;
            std::fs::write(&output, &report.workbook)
                .with_context(|| format!("could not write {}", output.display()))?;
            print_dashboard(&report.dashboard, json)?;
            println!(
                "\nWrote {} ({} issue sheets, {} rules checked)",
                output.display(),
                report.sheets.len() - 1, // minus the dashboard sheet
                report.dashboard.len()
            );
            Ok(())
        }
        Commands::Summary { input, json } => {
            let report = audit_file(&input)?;
            print_dashboard(&report.dashboard, json)?;
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn audit_file(input: &PathBuf) -> anyhow::Result<Report> {
    let file =
        File::open(input).with_context(|| format!("could not open {}", input.display()))?;
    pipeline::run(file).with_context(|| format!("audit of {} failed", input.display()))
}

fn print_dashboard(entries: &[DashboardEntry], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    println!("{:<28} | {:>6}", "Issue", "Count");
    println!("{}", "-".repeat(37));
    for e in entries {
        println!("{:<28} | {:>6}", e.issue, e.count);
    }
    let total: usize = entries.iter().map(|e| e.count).sum();
    println!("{}", "-".repeat(37));
    println!("{:<28} | {:>6}", "Total flagged rows", total);
    Ok(())
}
