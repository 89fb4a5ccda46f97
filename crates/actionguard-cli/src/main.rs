mod display;

use actionguard_core::config::Config;
use actionguard_core::enrich::Enricher;
use actionguard_core::parser::WorkflowParser;
use actionguard_core::report;
use actionguard_core::rules::{run_all, Finding, Severity, RULES};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(
    name = "actionguard",
    version,
    about = "actionguard — GitHub Actions Security Scanner",
    long_about = "Scan GitHub Actions workflow files for security anti-patterns: \
                  unpinned actions, overly broad permissions, script injection, \
                  dangerous triggers, and risky secret handling."
)]
struct Cli {
    /// Enable diagnostic logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan workflow files for security issues
    Scan {
        /// Path to a workflow file or a directory containing workflow files
        #[arg(default_value = ".github/workflows/")]
        path: PathBuf,

        /// Output format (console, json, sarif)
        #[arg(short, long, default_value = "console")]
        format: String,

        /// Enrich findings with AI-generated explanations and fixes
        #[arg(long)]
        enrich: bool,

        /// Minimum severity to report (overrides the config file)
        #[arg(long)]
        severity: Option<Severity>,

        /// Rule ids to ignore (repeatable, adds to the config file)
        #[arg(long = "ignore-rule")]
        ignore_rules: Vec<String>,

        /// Path to a config file (default: .actionguard.yml, discovered)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the registered rules
    Rules,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "actionguard=debug,actionguard_core=debug".into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Scan {
            path,
            format,
            enrich,
            severity,
            ignore_rules,
            config,
        } => cmd_scan(&path, &format, enrich, severity, ignore_rules, config.as_deref()),
        Commands::Rules => {
            display::print_rule_list(RULES);
            Ok(())
        }
    }
}

fn discover_workflow_files(path: &Path, config: &Config) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if path.is_dir() {
        let mut files: Vec<PathBuf> = glob::glob(&format!("{}/**/*.yml", path.display()))
            .context("failed to read glob pattern")?
            .chain(
                glob::glob(&format!("{}/**/*.yaml", path.display()))
                    .context("failed to read glob pattern")?,
            )
            .filter_map(|r| r.ok())
            .filter(|f| !config.is_excluded(f))
            .collect();
        files.sort();
        return Ok(files);
    }

    anyhow::bail!("path '{}' does not exist", path.display());
}

fn cmd_scan(
    path: &Path,
    format: &str,
    enrich: bool,
    severity: Option<Severity>,
    ignore_rules: Vec<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = Config::load(config_path, Some(path))?;
    if let Some(sev) = severity {
        config.severity = sev;
    }
    config.ignore_rules.extend(ignore_rules);

    let files = discover_workflow_files(path, &config)?;
    if files.is_empty() {
        anyhow::bail!(
            "no workflow files found at '{}'. Make sure the path points to a \
             YAML workflow file or directory.",
            path.display()
        );
    }

    // A malformed file fails on its own; the rest of the scan continues.
    let mut all_findings: Vec<Finding> = Vec::new();
    let mut scanned = Vec::new();
    for file in &files {
        let source = file.to_string_lossy().to_string();
        match WorkflowParser::parse_file(file) {
            Ok(workflow) => {
                all_findings.extend(run_all(&workflow, &source));
                scanned.push(file.clone());
            }
            Err(e) => {
                warn!(file = %source, error = %e, "skipping unparseable workflow");
                eprintln!("warning: skipping {source}: {e}");
            }
        }
    }

    let findings = config.filter(all_findings);

    if enrich && format != "console" {
        warn!(format, "--enrich only applies to console output");
        eprintln!("warning: --enrich only applies to console output, ignoring for format '{format}'");
    }

    if enrich && format == "console" {
        let enricher = Enricher::from_env();
        let contents = read_workflow_contents(&scanned);
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to build async runtime")?;
        // Each finding is explained against the YAML of its own file, not
        // the whole scanned set.
        let enrichments = runtime.block_on(async {
            let mut out = Vec::with_capacity(findings.len());
            for finding in &findings {
                let yaml = contents
                    .get(&finding.file_path)
                    .map(String::as_str)
                    .unwrap_or("");
                out.push(enricher.enrich(finding, yaml).await);
            }
            out
        });
        display::print_enriched_report(&findings, &enrichments, &path.to_string_lossy());
    } else {
        match format {
            "json" => println!("{}", report::to_json(&findings)),
            "sarif" => println!(
                "{}",
                serde_json::to_string_pretty(&report::sarif::to_sarif(&findings))?
            ),
            _ => display::print_report(&findings, &path.to_string_lossy()),
        }
    }

    if !findings.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// YAML content of every scanned file, keyed the way findings record their
/// `file_path`. Files that vanished between scan and read are skipped.
fn read_workflow_contents(files: &[PathBuf]) -> HashMap<String, String> {
    let mut contents = HashMap::new();
    for file in files {
        if let Ok(content) = std::fs::read_to_string(file) {
            contents.insert(file.to_string_lossy().to_string(), content);
        }
    }
    contents
}
