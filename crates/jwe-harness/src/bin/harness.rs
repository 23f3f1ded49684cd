//! CLI entrypoint for the JWE conformance harness.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use jwe_exec::{DirectJwe, StandardJwkParser};
use jwe_harness::structured_log::{now_utc, LogEmitter, LogEntry, LogLevel, Outcome};
use jwe_harness::{CaseRunner, ConformanceReport, SuppressionSet, VectorFile};

/// Conformance tooling for JWE decryption implementations.
#[derive(Debug, Parser)]
#[command(name = "jwe-harness")]
#[command(about = "Conformance testing harness for JWE decryption")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the vector corpus against the reference decrypter.
    Verify {
        /// Vector corpus JSON file.
        #[arg(long)]
        vectors: PathBuf,
        /// Optional suppression file (JSON array of test names).
        #[arg(long)]
        suppressions: Option<PathBuf>,
        /// Output report path (markdown; a .json twin is written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Partition cases across available execution units.
        #[arg(long)]
        parallel: bool,
        /// Optional fixed timestamp string for deterministic report generation.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Print the derived test names a corpus produces, one per line.
    ListNames {
        /// Vector corpus JSON file.
        #[arg(long)]
        vectors: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            vectors,
            suppressions,
            report,
            log,
            parallel,
            timestamp,
        } => {
            eprintln!("Verifying against vectors in {}", vectors.display());
            let file = VectorFile::from_file(&vectors)?;
            let suppression_set = match suppressions {
                Some(path) => SuppressionSet::from_file(&path)?,
                None => SuppressionSet::new(),
            };

            let run_id = timestamp.clone().unwrap_or_else(|| {
                format!(
                    "run-{}",
                    std::time::SystemTime::now()
                        .duration_since(std::time::UNIX_EPOCH)
                        .map(|d| d.as_secs())
                        .unwrap_or(0)
                )
            });
            let mut emitter = match &log {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    Some(LogEmitter::to_file(path, &run_id)?)
                }
                None => None,
            };

            if let Some(emitter) = emitter.as_mut() {
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "run_start").with_details(
                        serde_json::json!({
                            "vectors": vectors.display().to_string(),
                            "suppressions": suppression_set.len(),
                            "parallel": parallel,
                        }),
                    ),
                )?;
            }

            let started = Instant::now();
            let parser = StandardJwkParser;
            let decrypter = DirectJwe;
            let runner = CaseRunner::new(&parser, &decrypter);
            let cases = if parallel {
                runner.run_parallel(&file, &suppression_set)?
            } else {
                runner.run(&file, &suppression_set)?
            };
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            if let Some(emitter) = emitter.as_mut() {
                for case in &cases {
                    let outcome = if case.passed { Outcome::Pass } else { Outcome::Fail };
                    let level = if case.passed { LogLevel::Info } else { LogLevel::Error };
                    let mut entry = LogEntry::new("", level, "case_finished")
                        .with_test_name(&case.name)
                        .with_outcome(outcome)
                        .with_suppressed(case.suppressed);
                    if !case.passed {
                        entry = entry
                            .with_details(serde_json::json!({"diagnostic": case.diagnostic}));
                    }
                    emitter.emit_entry(entry)?;
                }
            }

            let report_doc = ConformanceReport::new(
                "JWE Conformance Report",
                timestamp.unwrap_or_else(now_utc),
                cases,
            );

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}, known failures={}",
                report_doc.summary.total,
                report_doc.summary.passed,
                report_doc.summary.failed,
                report_doc.summary.known_failures
            );

            if let Some(emitter) = emitter.as_mut() {
                emitter.emit_entry(
                    LogEntry::new("", LogLevel::Info, "run_finished")
                        .with_duration_ms(elapsed_ms)
                        .with_details(serde_json::json!({
                            "total": report_doc.summary.total,
                            "passed": report_doc.summary.passed,
                            "failed": report_doc.summary.failed,
                        })),
                )?;
                emitter.flush()?;
            }

            if let Some(report_path) = report {
                if let Some(parent) = report_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                eprintln!("Writing report to {}", report_path.display());
                std::fs::write(&report_path, report_doc.to_markdown())?;
                let json_path = report_path.with_extension("json");
                std::fs::write(&json_path, report_doc.to_json()?)?;
            }

            if !report_doc.summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::ListNames { vectors } => {
            let file = VectorFile::from_file(&vectors)?;
            for name in file.case_names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
