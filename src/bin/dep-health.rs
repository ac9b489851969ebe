//! CLI tool for scoring npm dependency health

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use npm_dependency_health::{
    audit_project, AuditConfig, DependencyResult, DiskCache, Grade, ProjectResult, ResponseCache,
};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dep-health")]
#[command(about = "Score the health of npm project dependencies", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the project (directory containing package.json, or the file itself)
    #[arg(short = 'p', long, default_value = ".")]
    project_path: PathBuf,

    /// Path to custom configuration file (TOML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Dependencies to ignore (can be specified multiple times)
    #[arg(long = "ignore")]
    ignore_dependencies: Vec<String>,

    /// Do not read or write the response cache
    #[arg(long)]
    no_cache: bool,

    /// Directory for cached registry responses
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score dependencies and display a summary
    Scan {
        /// Include devDependencies
        #[arg(long)]
        dev: bool,

        /// Display signals and warnings for each dependency
        #[arg(long)]
        detailed: bool,
    },

    /// Generate detailed health report
    Report {
        /// Output format
        #[arg(short = 'f', long, default_value = "json")]
        format: ReportFormat,

        /// Output file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Include devDependencies
        #[arg(long)]
        dev: bool,
    },

    /// Check dependencies against thresholds (exit code based)
    Check {
        /// Include devDependencies
        #[arg(long)]
        dev: bool,

        /// Also fail when any dependency scores below this value (0-100)
        #[arg(long)]
        min_score: Option<u8>,
    },

    /// Remove all cached registry responses
    ClearCache,
}

#[derive(Clone, Debug)]
enum ReportFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(config_path) => match load_config(config_path) {
            Ok(cfg) => cfg,
            Err(e) => fail(&format!("Failed to load config: {:#}", e)),
        },
        None => AuditConfig::default(),
    };

    for dep in &cli.ignore_dependencies {
        config.ignored_dependencies.insert(dep.clone());
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache.directory = Some(dir.clone());
    }

    let include_dev = match &cli.command {
        Commands::Scan { dev, .. } | Commands::Report { dev, .. } | Commands::Check { dev, .. } => {
            *dev
        }
        Commands::ClearCache => {
            clear_cache(&config).await;
            return;
        }
    };
    config.include_dev |= include_dev;

    let report = run_audit(&cli.project_path, &config).await;

    match cli.command {
        Commands::Scan { detailed, .. } => {
            display_summary(&report);
            if detailed {
                println!();
                display_detailed(&report);
            }
            exit_on_failing_grades(&report, config.include_dev);
        }

        Commands::Report { format, output, .. } => {
            let content = match format {
                ReportFormat::Json => generate_json_report(&report),
                ReportFormat::Markdown => generate_markdown_report(&report),
            };

            if let Some(output_path) = output {
                match std::fs::write(&output_path, content) {
                    Ok(_) => eprintln!("Report written to: {}", output_path.display()),
                    Err(e) => fail(&format!("Failed to write report: {}", e)),
                }
            } else {
                println!("{}", content);
            }
            exit_on_failing_grades(&report, config.include_dev);
        }

        Commands::Check { min_score, .. } => {
            let mut failures: Vec<String> = report
                .failing(config.include_dev)
                .iter()
                .map(|dep| format!("  - {}@{}: grade F", dep.name, dep.version_constraint))
                .collect();

            if let Some(min) = min_score {
                for dep in report.all_dependencies() {
                    if dep.score < min && !dep.is_failing() {
                        failures.push(format!(
                            "  - {}@{}: score {} < {}",
                            dep.name, dep.version_constraint, dep.score, min
                        ));
                    }
                }
            }

            if !failures.is_empty() {
                eprintln!("{} {} check failures:", "Failed:".red().bold(), failures.len());
                for failure in failures {
                    eprintln!("{}", failure);
                }
                process::exit(1);
            } else {
                println!("{} All checks passed!", "Success:".green().bold());
            }
        }

        Commands::ClearCache => {}
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: &Path) -> anyhow::Result<AuditConfig> {
    AuditConfig::from_file(path).with_context(|| format!("reading {}", path.display()))
}

fn fail(message: &str) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    process::exit(1);
}

async fn clear_cache(config: &AuditConfig) {
    let directory = config.cache.resolved_directory();
    let disk_cache = DiskCache::new(directory.clone());
    match disk_cache.clear().await {
        Ok(()) => println!("Cleared cache at {}", directory.display()),
        Err(e) => fail(&format!("Failed to clear cache: {}", e)),
    }
}

async fn run_audit(project_path: &Path, config: &AuditConfig) -> ProjectResult {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Scoring dependencies...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let result = audit_project(project_path, config).await;

    spinner.finish_and_clear();

    match result {
        Ok(report) => report,
        Err(e) => fail(&format!("Audit failed: {}", e)),
    }
}

/// Exit non-zero when any in-scope dependency is graded F
fn exit_on_failing_grades(report: &ProjectResult, include_dev: bool) {
    let failing = report.failing(include_dev);
    if failing.is_empty() {
        return;
    }

    eprintln!(
        "\n{} {} dependencies graded F:",
        "Failed:".red().bold(),
        failing.len()
    );
    for dep in &failing {
        match &dep.error {
            Some(error) => eprintln!("  - {}: {}", dep.name, error),
            None => eprintln!("  - {}: score {}", dep.name, dep.score),
        }
    }
    process::exit(1);
}

fn colored_grade(grade: Grade) -> ColoredString {
    let text = grade.to_string();
    match grade {
        Grade::A => text.green().bold(),
        Grade::B => text.green(),
        Grade::C => text.yellow(),
        Grade::D => text.truecolor(255, 165, 0), // Orange
        Grade::F => text.red().bold(),
    }
}

fn display_summary(report: &ProjectResult) {
    println!("\n{}", "=== Dependency Health ===".bold());
    println!("Project: {}", report.project_name.cyan());
    println!();

    print_table("Dependencies", &report.dependencies);
    if !report.dev_dependencies.is_empty() {
        println!();
        print_table("Dev dependencies", &report.dev_dependencies);
    }

    let summary = &report.summary;
    println!();
    println!(
        "Grades: {} A, {} B, {} C, {} D, {} F ({} unresolved)",
        summary.grade_a, summary.grade_b, summary.grade_c, summary.grade_d, summary.grade_f,
        summary.unresolved
    );
    println!(
        "Project score: {} ({})",
        report.project_score.to_string().bold(),
        colored_grade(report.project_grade)
    );
}

fn print_table(title: &str, dependencies: &[DependencyResult]) {
    println!("{}", title.bold());

    // Worst first
    let mut sorted: Vec<&DependencyResult> = dependencies.iter().collect();
    sorted.sort_by_key(|d| d.score);

    let width = sorted.iter().map(|d| d.name.len()).max().unwrap_or(4).max(4);
    println!(
        "  {:<width$}  {:>5}  {:<5}  {:<10}  {:>12}  {:>10}",
        "Name", "Score", "Grade", "Maint.", "Weekly DLs", "Size",
        width = width
    );

    for dep in sorted {
        let maintenance = dep
            .maintenance
            .as_ref()
            .map(|m| m.status.to_string())
            .unwrap_or_else(|| "-".to_string());
        let downloads = dep
            .popularity
            .as_ref()
            .map(|p| p.weekly_downloads.to_string())
            .unwrap_or_else(|| "-".to_string());
        let size = dep
            .size
            .as_ref()
            .map(|s| s.unpacked_size_human.clone())
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<width$}  {:>5}  {:<5}  {:<10}  {:>12}  {:>10}",
            dep.name,
            dep.score,
            colored_grade(dep.grade),
            maintenance,
            downloads,
            size,
            width = width
        );

        if let Some(alt) = &dep.alternative {
            println!("    {} consider {}: {}", "→".cyan(), alt.name.cyan(), alt.reason);
        }
    }
}

fn display_detailed(report: &ProjectResult) {
    println!("{}", "=== Detailed Results ===".bold());

    for dep in report.all_dependencies() {
        println!(
            "\n{}@{} [{}] Score: {}",
            dep.name.bold(),
            dep.version_constraint,
            colored_grade(dep.grade),
            dep.score
        );

        if let Some(error) = &dep.error {
            println!("  Error: {}", error.red());
            continue;
        }

        let b = &dep.breakdown;
        println!(
            "  Points: maintenance {}/30, popularity {}/20, size {}/15, security {}/25, trend {}/10",
            b.maintenance, b.popularity, b.size, b.security, b.trend
        );

        if let Some(m) = &dep.maintenance {
            match m.days_since_publish {
                Some(days) => println!("  Last publish: {} days ago ({})", days, m.status),
                None => println!("  Last publish: unknown ({})", m.status),
            }
        }
        if let Some(p) = &dep.popularity {
            println!(
                "  Downloads: {}/week, {} ({:+.1}%)",
                p.weekly_downloads, p.trend, p.trend_percent
            );
        }
        if let Some(s) = &dep.security {
            println!(
                "  Vulnerabilities: {} (severity {})",
                s.vulnerability_count, s.severity
            );
        }

        if !dep.warnings.is_empty() {
            println!("  Warnings:");
            for warning in &dep.warnings {
                println!("    - {}", warning.yellow());
            }
        }
    }
}

fn generate_json_report(report: &ProjectResult) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| fail(&format!("Failed to serialize report: {}", e)))
}

fn generate_markdown_report(report: &ProjectResult) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Dependency Health Report: {}\n\n", report.project_name));
    md.push_str(&format!("**Generated:** {}\n\n", report.timestamp));
    md.push_str(&format!(
        "**Project score:** {} ({})\n\n",
        report.project_score, report.project_grade
    ));

    let summary = &report.summary;
    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Total dependencies: {}\n", summary.total_dependencies));
    md.push_str(&format!(
        "- Grades: A {} / B {} / C {} / D {} / F {}\n",
        summary.grade_a, summary.grade_b, summary.grade_c, summary.grade_d, summary.grade_f
    ));
    md.push_str(&format!("- Unresolved: {}\n", summary.unresolved));
    md.push_str(&format!(
        "- With suggested alternatives: {}\n\n",
        summary.with_alternatives
    ));

    push_markdown_table(&mut md, "Dependencies", &report.dependencies);
    if !report.dev_dependencies.is_empty() {
        push_markdown_table(&mut md, "Dev dependencies", &report.dev_dependencies);
    }

    md
}

fn push_markdown_table(md: &mut String, title: &str, dependencies: &[DependencyResult]) {
    md.push_str(&format!("## {}\n\n", title));
    md.push_str("| Name | Constraint | Score | Grade | Maintenance | Weekly downloads | Size | Notes |\n");
    md.push_str("|------|------------|-------|-------|-------------|------------------|------|-------|\n");

    for dep in dependencies {
        let notes = match (&dep.error, &dep.alternative) {
            (Some(error), _) => escape_cell(error),
            (None, Some(alt)) => format!("consider {}", alt.name),
            (None, None) => String::new(),
        };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            escape_cell(&dep.name),
            escape_cell(&dep.version_constraint),
            dep.score,
            dep.grade,
            dep.maintenance
                .as_ref()
                .map(|m| m.status.to_string())
                .unwrap_or_default(),
            dep.popularity
                .as_ref()
                .map(|p| p.weekly_downloads.to_string())
                .unwrap_or_default(),
            dep.size
                .as_ref()
                .map(|s| s.unpacked_size_human.clone())
                .unwrap_or_default(),
            notes
        ));
    }
    md.push('\n');
}

/// Constraints like `^1.0.0 || ^2.0.0` would otherwise split the row
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
