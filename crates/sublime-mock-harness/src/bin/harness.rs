//! CLI entrypoint for the sublime_api drift harness.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use sublime_mock_api::{Arg, HostContext, Namespace, SurfaceCatalog, encode_value};
use sublime_mock_harness::report::json_sibling;
use sublime_mock_harness::structured_log::{LogEmitter, validate_log_file};
use sublime_mock_harness::{DriftCheck, DriftReport, ReferenceSnapshot, VerifyError, load_reference};

/// Drift tooling for the sublime_api stand-in.
#[derive(Debug, Parser)]
#[command(name = "sublime-mock-harness")]
#[command(about = "Compare the sublime_api stand-in against a recorded host surface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Markdown,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify the stand-in against a reference snapshot.
    Verify {
        /// Reference snapshot JSON recorded from the host.
        #[arg(long)]
        reference: PathBuf,
        /// Output report path (markdown; a JSON sibling is written too).
        #[arg(long)]
        report: Option<PathBuf>,
        /// JSONL log of every verification entry.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Format printed to stdout.
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Only check that every reference attribute exists in the stand-in.
    Missing {
        /// Reference snapshot JSON recorded from the host.
        #[arg(long)]
        reference: PathBuf,
    },
    /// Write the stand-in's own surface as a snapshot.
    Export {
        /// Output path for snapshot JSON.
        #[arg(long)]
        output: PathBuf,
        /// Value recorded in the snapshot's `host` field.
        #[arg(long, default_value = "sublime-mock")]
        host: String,
    },
    /// Call one stub and print its encoded result.
    Call {
        /// Stub name.
        name: String,
        /// Positional arguments as JSON (bare words are taken as strings).
        args: Vec<String>,
    },
    /// List every catalog entry with its parameters.
    List,
    /// Validate a JSONL log written by `verify --log` or the json trace mode.
    ValidateLog {
        /// Path to the JSONL file.
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            reference,
            report,
            log,
            format,
        } => {
            eprintln!("Verifying stand-in against {}", reference.display());
            let catalog = SurfaceCatalog::from_env();
            let check = DriftCheck::new("sublime_api Drift Report");
            let loaded = load_reference(&reference);
            let reference_ns = match &loaded {
                Ok(ns) => Some(ns as &dyn Namespace),
                Err(err) => {
                    eprintln!("{err}");
                    None
                }
            };

            let outcome = match log {
                Some(log_path) => {
                    let mut emitter = LogEmitter::to_file(&log_path, &std::process::id().to_string())?;
                    let outcome = check.run_logged(reference_ns, &catalog, &mut emitter)?;
                    eprintln!(
                        "Wrote {} log records to {}",
                        emitter.emitted(),
                        log_path.display()
                    );
                    outcome
                }
                None => check.run(reference_ns, &catalog),
            };
            let report_doc = match outcome {
                Ok(report_doc) => report_doc,
                Err(VerifyError::ReferenceUnavailable { .. }) => {
                    eprintln!("Verification skipped: no reference available");
                    return Ok(());
                }
            };

            match format {
                Format::Text => print!("{}", report_doc.to_text()),
                Format::Markdown => print!("{}", report_doc.to_markdown()),
                Format::Json => println!("{}", report_doc.to_json()),
            }
            eprintln!(
                "Verification complete: total={}, matched={}, mismatched={}, missing={}, errors={}",
                report_doc.summary.total,
                report_doc.summary.matched,
                report_doc.summary.mismatched,
                report_doc.summary.missing,
                report_doc.summary.failed
            );

            if let Some(report_path) = report {
                write_report(&report_doc, &report_path)?;
            }

            if !report_doc.summary.all_matched() {
                return Err("Drift verification failed".into());
            }
        }
        Command::Missing { reference } => {
            let catalog = SurfaceCatalog::new();
            let reference_ns = match load_reference(&reference) {
                Ok(ns) => ns,
                Err(err) => {
                    eprintln!("{err}");
                    eprintln!("Missing-attribute check skipped: no reference available");
                    return Ok(());
                }
            };
            let report_doc = DriftCheck::new("sublime_api Missing Attributes")
                .run(Some(&reference_ns), &catalog)?;
            print!("{}", report_doc.missing_text());
            if !report_doc.summary.all_present() {
                return Err(format!(
                    "{} reference attribute(s) missing from the stand-in",
                    report_doc.summary.missing
                )
                .into());
            }
        }
        Command::Export { output, host } => {
            let catalog = SurfaceCatalog::new();
            let snapshot = ReferenceSnapshot::capture(&catalog, host)?;
            std::fs::write(&output, snapshot.to_json()?)?;
            eprintln!(
                "Exported {} attributes to {}",
                snapshot.attributes.len(),
                output.display()
            );
        }
        Command::Call { name, args } => {
            let catalog = SurfaceCatalog::from_env();
            let ctx = HostContext::from_env();
            let args = args.iter().map(|raw| Arg::from(parse_arg(raw))).collect();
            let result = catalog.call(&name, args, &ctx)?;
            println!("{}", encode_value(&result, false));
        }
        Command::List => {
            let catalog = SurfaceCatalog::new();
            for entry in catalog.entries() {
                println!("{}", entry.render());
            }
            eprintln!("{} entries, fingerprint {}", catalog.len(), catalog.fingerprint());
        }
        Command::ValidateLog { path } => {
            let (lines, errors) = validate_log_file(&path)?;
            for error in &errors {
                eprintln!("{error}");
            }
            eprintln!("Validated {lines} lines from {}", path.display());
            if !errors.is_empty() {
                return Err(format!("{} log validation error(s)", errors.len()).into());
            }
        }
    }

    Ok(())
}

fn write_report(report_doc: &DriftReport, report_path: &std::path::Path) -> std::io::Result<()> {
    eprintln!("Writing report to {}", report_path.display());
    std::fs::write(report_path, report_doc.to_markdown())?;
    let json_path = json_sibling(report_path);
    std::fs::write(&json_path, report_doc.to_json())?;
    eprintln!("Wrote JSON report to {}", json_path.display());
    Ok(())
}

fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
