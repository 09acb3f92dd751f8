//! Consistency checker and repair tool for a sharded airline route dataset.
#![warn(
    clippy::all,
    clippy::restriction,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    rust_2018_idioms,
    missing_debug_implementations,
    missing_docs
)]
#![allow(clippy::module_inception)]
#![allow(clippy::implicit_return)]
#![allow(clippy::blanket_clippy_restriction_lints)]
#![allow(clippy::shadow_same)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::separated_literal_suffix)]
#![allow(clippy::use_self)]
#![allow(clippy::pattern_type_mismatch)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]
#![allow(clippy::exit)]

use clap::{Parser, Subcommand};
use env_logger::Env;
use indicatif::{ProgressBar, ProgressDrawTarget};
use log::error;
use route_audit::checker::{Finding, Kind, Summary, ValidationReport};
use route_audit::components::prelude::*;
use route_audit::dataset::{DataPaths, Dataset};
use route_audit::filters::{is_domestic, RouteFilter};
use route_audit::DataError;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

const DEFAULT_DATA_DIR: &str = "public/data";

#[derive(Parser, Debug)]
#[command(
    name = "route-audit",
    version,
    about = "Checks and repairs a sharded airline route dataset"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "ROUTE_AUDIT_DATA_DIR",
        default_value = DEFAULT_DATA_DIR,
        help = "Directory holding airports/, airports.json, airlines.json and coverage.json"
    )]
    data_dir: PathBuf,
    #[arg(long, global = true, help = "Coverage manifest to use instead of <data-dir>/coverage.json")]
    manifest: Option<PathBuf>,
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every consistency check, exiting non-zero if any error is found
    Check,
    /// Add the missing reverse of every route between two tracked airports
    Repair,
    /// Cite the carrier's timetable on routes without sources
    Attribute,
    /// Print coverage figures from the manifest
    Coverage,
    /// List the routes of one airport
    Routes {
        iata: String,
        #[arg(long, help = "Only routes of this carrier")]
        carrier: Option<String>,
        #[arg(long, default_value_t = false, help = "Only routes within Japan")]
        domestic: bool,
    },
}

#[derive(Serialize)]
struct JsonOut<T: Serialize> {
    ok: bool,
    data: T,
}

fn print_one<T: Serialize>(
    json: bool,
    ok: bool,
    data: T,
    text: impl Fn(&T) -> String,
) -> Result<(), DataError> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonOut { ok, data })?
        );
    } else {
        println!("{}", text(&data));
    }
    Ok(())
}

#[derive(Serialize)]
struct CheckOut<'a> {
    summary: Summary,
    findings: &'a [Finding],
}

#[derive(Serialize)]
struct RouteRow {
    carrier: CarrierCode,
    origin: AirportCode,
    destination: AirportCode,
    intl: Option<bool>,
    freq_per_day: Option<u32>,
    domestic: bool,
    attributed: bool,
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn render_report(report: &ValidationReport) -> String {
    let summary = report.summary();
    let mut lines = vec![format!(
        "Summary: {} info, {}, {}",
        summary.info,
        plural(summary.warning, "warning"),
        plural(summary.error, "error")
    )];
    for (kind, findings) in report.grouped() {
        if findings.is_empty() {
            continue;
        }
        let heading = match kind {
            Kind::Info => "INFO",
            Kind::Warning => "WARNINGS",
            Kind::Error => "ERRORS",
        };
        lines.push(String::new());
        lines.push(heading.to_owned());
        for finding in findings {
            lines.push(format!("  [{}] {}", finding.category, finding.message));
        }
    }
    lines.push(String::new());
    if report.has_errors() {
        lines.push(format!("Validation failed with {}", plural(summary.error, "error")));
    } else {
        lines.push("All checks passed".to_owned());
    }
    lines.join("\n")
}

async fn run(cli: Cli) -> Result<i32, DataError> {
    let mut paths = DataPaths::new(&cli.data_dir);
    if let Some(manifest) = cli.manifest {
        paths = paths.with_manifest(manifest);
    }
    let json = cli.json;
    // stdout carries the command output, so progress goes to stderr and is kept out of JSON runs.
    let progress = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr())
    };
    let mut dataset = Dataset::load(&paths, progress).await?;

    match cli.command {
        Commands::Check => {
            let report = dataset.validate();
            let ok = !report.has_errors();
            let out = CheckOut {
                summary: report.summary(),
                findings: &report.findings,
            };
            print_one(json, ok, out, |_| render_report(&report))?;
            return Ok(i32::from(!ok));
        }
        Commands::Repair => {
            let outcome = dataset.repair(&IsoDate::today())?;
            print_one(json, true, outcome, |o| {
                let shards: Vec<&str> = o.updated_shards.iter().map(AirportCode::as_str).collect();
                let mut text = format!(
                    "Added {}\nUpdated {}: {}\nSkipped {} without a destination shard, {}",
                    plural(o.added_edges, "reverse route"),
                    plural(o.updated_shards.len(), "shard"),
                    shards.join(", "),
                    plural(o.missing_shards, "route"),
                    plural(o.duplicates, "duplicate")
                );
                if !o.mislabelled_shards.is_empty() {
                    let skipped: Vec<&str> =
                        o.mislabelled_shards.iter().map(AirportCode::as_str).collect();
                    text.push_str(&format!("\nSkipped mislabelled shards: {}", skipped.join(", ")));
                }
                text
            })?;
        }
        Commands::Attribute => {
            let outcome = dataset.attribute(&IsoDate::today())?;
            print_one(json, true, outcome, |o| {
                format!(
                    "Processed {}\nAdded sources to {} ({} requiring verification)\nUpdated {}",
                    plural(o.routes_processed, "route"),
                    plural(o.routes_updated, "route"),
                    o.placeholders,
                    plural(o.updated_shards.len(), "shard")
                )
            })?;
        }
        Commands::Coverage => {
            print_one(json, true, dataset.coverage(), |c| {
                format!(
                    "Airlines: {}/{} ({}%), {} planned\nAirports: {}/{} ({}%), {} planned",
                    c.airlines.implemented,
                    c.airlines.total,
                    c.airlines.coverage,
                    c.airlines.planned,
                    c.airports.implemented,
                    c.airports.total,
                    c.airports.coverage,
                    c.airports.planned
                )
            })?;
        }
        Commands::Routes {
            iata,
            carrier,
            domestic,
        } => {
            let origin = AirportCode::from(iata.to_uppercase());
            let Some(shard) = dataset.shards.get(&origin) else {
                return Err(DataError::FileNotFoundError(dataset.shards.shard_path(&origin)));
            };
            let filter = RouteFilter::new(carrier.map(CarrierCode::from), domestic);
            let rows: Vec<RouteRow> = filter
                .apply(shard, &dataset.airports)
                .map(|(carrier, route)| RouteRow {
                    carrier: carrier.clone(),
                    origin: origin.clone(),
                    destination: route.iata.clone(),
                    intl: route.intl,
                    freq_per_day: route.freq_per_day.flatten(),
                    domestic: is_domestic(&origin, &route.iata, &dataset.airports),
                    attributed: route.is_attributed(),
                })
                .collect();
            print_one(json, true, rows, |rows| {
                rows.iter()
                    .map(|r| {
                        let freq = r.freq_per_day.map_or_else(|| "-".to_owned(), |f| f.to_string());
                        format!("{}\t{}→{}\t{}/day", r.carrier, r.origin, r.destination, freq)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
        }
    }
    Ok(0)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            process::exit(2);
        }
    }
}
