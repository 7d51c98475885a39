//! Command-line front end for the achievements store.
//!
//! # Responsibility
//! - Import achievement workbooks into a SQLite store.
//! - Print per-student participation reports.

use achievements_core::db::open_db;
use achievements_core::{
    default_log_level, init_logging_with, ImportService, LoggingConfig, ReportService,
    SqliteActivityRepository, SqliteReportRepository, StudentReport, DEFAULT_MESSAGE_LIMIT,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "achievements")]
#[command(about = "Import student achievement workbooks and build participation reports")]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, default_value = "achievements.sqlite3")]
    db: PathBuf,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for log files; logging stays off when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import every sheet of a workbook
    Import {
        workbook: PathBuf,
        /// Print the full summary as JSON
        #[arg(long)]
        json: bool,
        /// Lines shown per message list
        #[arg(long, default_value_t = DEFAULT_MESSAGE_LIMIT)]
        limit: usize,
    },
    /// Show one student's participations by event start date
    Report {
        #[arg(long)]
        student: String,
        /// First start date, YYYY-MM-DD
        #[arg(long)]
        from: NaiveDate,
        /// Last start date, YYYY-MM-DD
        #[arg(long)]
        to: NaiveDate,
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| default_log_level().to_string());
        let config = LoggingConfig {
            mirror_warnings: true,
            ..LoggingConfig::new(level, log_dir.clone())
        };
        init_logging_with(&config).map_err(anyhow::Error::msg)?;
    }

    match cli.command {
        Commands::Import {
            workbook,
            json,
            limit,
        } => run_import(&cli.db, &workbook, json, limit),
        Commands::Report {
            student,
            from,
            to,
            json,
        } => run_report(&cli.db, &student, from, to, json),
    }
}

fn run_import(db: &Path, workbook: &Path, json: bool, limit: usize) -> Result<()> {
    let bytes = std::fs::read(workbook)
        .with_context(|| format!("failed to read workbook `{}`", workbook.display()))?;
    let mut conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let repo = SqliteActivityRepository::try_new(&mut conn)?;
    let mut service = ImportService::new(repo);

    let summary = service.import_workbook(&bytes)?;
    info!(
        "event=cli_import module=cli status=ok sheets={} failed={}",
        summary.sheets_total,
        summary.sheets_failed()
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.display_text(limit));
    }
    Ok(())
}

fn run_report(db: &Path, student: &str, from: NaiveDate, to: NaiveDate, json: bool) -> Result<()> {
    let conn = open_db(db).with_context(|| format!("failed to open `{}`", db.display()))?;
    let repo = SqliteReportRepository::try_new(&conn)?;
    let service = ReportService::new(repo);
    let report = service.student_report(student, from, to)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &StudentReport) {
    println!("{}", report.student);
    println!("Период: {} — {}", report.date_from, report.date_to);
    if report.rows.is_empty() {
        println!("Участий не найдено");
        return;
    }
    for row in &report.rows {
        println!(
            "{} — {} | {} | {} | {} | {} ч.",
            row.start_date.format("%d.%m.%Y"),
            row.end_date.format("%d.%m.%Y"),
            row.event_name,
            row.level_label,
            row.role,
            row.hours
        );
    }
    println!("Всего часов: {}", report.total_hours);
}
