use std::path::PathBuf;

use anyhow::Context;
use burnout_early_warning::loader::{self, Loader};
use burnout_early_warning::models::TimelineEntry;
use burnout_early_warning::report::{self, ReportInput};
use burnout_early_warning::{risk, team, telemetry, trends};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "burnout-early-warning")]
#[command(about = "Burnout scoring and trend timeline for on-call teams", long_about = None)]
struct Cli {
    /// Analysis window used when the input does not state one
    #[arg(long, global = true, env = "BURNOUT_TIME_RANGE_DAYS", default_value_t = 30.0)]
    time_range_days: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank members by burnout score
    Score {
        #[arg(long)]
        analysis: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Show team-level burnout factors
    Team {
        #[arg(long)]
        analysis: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show standout days in the daily health series
    Timeline {
        #[arg(long)]
        trends: PathBuf,
        /// Supplies the fallback team health when the series is empty
        #[arg(long)]
        analysis: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        analysis: PathBuf,
        #[arg(long)]
        trends: Option<PathBuf>,
        #[arg(long)]
        team: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Score members from a CSV export
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing("info");
    let cli = Cli::parse();
    let loader = Loader::new();
    let days = cli.time_range_days;

    match cli.command {
        Commands::Score {
            analysis,
            limit,
            json,
        } => {
            let members = loader
                .load_analysis(&analysis)?
                .members(days)
                .with_context(|| format!("no members in {}", analysis.display()))?;
            let scored = risk::score_members(&members);

            if json {
                return print_json(&scored.iter().take(limit).collect::<Vec<_>>());
            }
            if scored.is_empty() {
                println!("No members found in this analysis.");
                return Ok(());
            }

            println!("Top members by burnout score:");
            for member in scored.iter().take(limit) {
                println!(
                    "- {} score {:.1} ({}) across {} incidents",
                    member.metrics.name,
                    member.burnout.score,
                    member.burnout.risk_level.as_str(),
                    member.metrics.incident_count
                );
            }
        }
        Commands::Team { analysis, json } => {
            let members = loader
                .load_analysis(&analysis)?
                .members(days)
                .with_context(|| format!("no members in {}", analysis.display()))?;
            let summary = team::summarize_team(&risk::score_members(&members));

            if json {
                return print_json(&summary);
            }
            if summary.factors.is_empty() {
                println!("No members with incidents in this window.");
                return Ok(());
            }

            println!(
                "Team factors across {} of {} members:",
                summary.members_with_incidents, summary.total_members
            );
            for factor in &summary.factors {
                println!(
                    "- {}: {:.1} ({}, {})",
                    factor.name,
                    factor.value,
                    factor.severity.label(),
                    factor.color
                );
            }
            for factor in &summary.high_risk_factors {
                println!("High risk: {} {:.1}", factor.name, factor.value);
            }
        }
        Commands::Timeline {
            trends: trends_path,
            analysis,
            json,
        } => {
            let points = loader.load_trends(&trends_path)?;
            let fallback = match &analysis {
                Some(path) => loader.load_analysis(path)?.team_health_overall(),
                None => None,
            };
            let health = team::team_health_display(&points, fallback);
            let timeline: Vec<TimelineEntry> =
                trends::build_timeline(&points, health, Utc::now().date_naive());

            if json {
                return print_json(&timeline);
            }
            let mut output = String::new();
            report::write_timeline(&mut output, &timeline);
            print!("{output}");
        }
        Commands::Report {
            analysis,
            trends: trends_path,
            team: team_name,
            out,
        } => {
            let document = loader.load_analysis(&analysis)?;
            let members = document.members(days)?;
            let daily_trends = match &trends_path {
                Some(path) => loader.load_trends(path)?,
                None => Vec::new(),
            };
            let report = report::build_report(&ReportInput {
                team: team_name.as_deref(),
                time_range_days: document.time_range_days(days),
                members: &members,
                daily_trends: &daily_trends,
                fallback_health: document.team_health_overall(),
                today: Utc::now().date_naive(),
            });
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Import { csv, limit } => {
            let members = loader::import_csv(&csv, days)?;
            let scored = risk::score_members(&members);
            println!("Scored {} members from {}.", scored.len(), csv.display());
            for member in scored.iter().take(limit) {
                println!(
                    "- {} ({}) score {:.1} ({})",
                    member.metrics.name,
                    member.metrics.email,
                    member.burnout.score,
                    member.burnout.risk_level.as_str()
                );
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}
