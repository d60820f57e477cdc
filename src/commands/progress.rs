//! Progress commands: `stats`, `attempts`, `reset`

use chrono::Utc;
use tracing::debug;

use crate::cli::{AttemptsArgs, OutputFormat, StatsArgs};
use crate::commands::dispatch::CommandContext;
use crate::commands::helpers::{format_ts, pct};
use orals_core::bail_usage;
use orals_core::error::Result;
use orals_core::progress::{get_stats, progress_report, Attempt, ProgressReport, Stats};

pub fn execute_stats(ctx: &CommandContext, args: &StatsArgs) -> Result<()> {
    let attempts = ctx.progress_store()?.attempts()?;
    // The library only supplies the denominator for "reviewed of total"
    let total_cases = match ctx.library() {
        Ok(library) => library.len(),
        Err(e) => {
            debug!(error = %e, "no case library for stats");
            0
        }
    };

    let stats = get_stats(&attempts, total_cases);
    let report = progress_report(
        &attempts,
        args.range,
        Utc::now().timestamp_millis(),
        args.lowest,
    );

    match ctx.cli.format {
        OutputFormat::Human => output_stats_human(&stats, &report),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "stats": stats,
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Records => output_stats_records(&stats, &report),
    }
    Ok(())
}

fn output_stats_human(stats: &Stats, report: &ProgressReport) {
    println!(
        "Reviewed {} of {} cases, {} attempts ({} oral, {} mcq)",
        stats.reviewed_count,
        stats.total_cases,
        stats.attempt_count,
        stats.oral_count,
        stats.mcq_count
    );
    println!(
        "Average oral {}%, average mcq {}%",
        pct(stats.avg_oral_score),
        pct(stats.avg_mcq_score)
    );

    let summary = &report.summary;
    println!();
    println!("{}:", summary.range_label);
    println!(
        "  {} attempts over {} cases ({:.1} per case)",
        summary.total_attempts, summary.unique_cases, summary.avg_per_case
    );
    println!(
        "  Average {}% ({}), most recent {}%",
        summary.avg_score_pct,
        summary.avg_band.label(),
        summary.most_recent_pct
    );
    if summary.at_risk_subspecialties > 0 {
        println!(
            "  {} subspecialties at risk",
            summary.at_risk_subspecialties
        );
    }

    if !report.by_subspecialty.is_empty() {
        println!();
        println!("By subspecialty:");
        for s in &report.by_subspecialty {
            println!("  {:<38} {:>3}%  {}", s.subspecialty, s.mean_pct, s.band.label());
        }
    }

    if !report.trend.is_empty() {
        println!();
        println!("Daily trend:");
        for t in &report.trend {
            println!("  {}  {:>3}%  ({} attempts)", t.day, t.mean_pct, t.attempts);
        }
    }

    println!();
    let grades: Vec<String> = report
        .grades
        .iter()
        .map(|(letter, n)| format!("{}:{}", letter, n))
        .collect();
    println!("Grades: {}", grades.join(" "));

    if !report.lowest.is_empty() {
        println!();
        println!("Lowest scores:");
        for a in &report.lowest {
            println!("  {:<12} {:>3}%  {}", a.case_id, pct(a.similarity), format_ts(a.ts));
        }
    }
}

fn output_stats_records(stats: &Stats, report: &ProgressReport) {
    let summary = &report.summary;
    println!(
        "H orals=1 records=1 mode=stats range={} reviewed={} total_cases={} attempts={} avg_pct={} band={}",
        summary.range.as_str(),
        stats.reviewed_count,
        stats.total_cases,
        summary.total_attempts,
        summary.avg_score_pct,
        summary.avg_band.label()
    );
    for s in &report.by_subspecialty {
        println!("S \"{}\" {} {}", s.subspecialty, s.mean_pct, s.band.label());
    }
    for (letter, n) in &report.grades {
        println!("G {} {}", letter, n);
    }
}

pub fn execute_attempts(ctx: &CommandContext, args: &AttemptsArgs) -> Result<()> {
    let attempts = ctx.progress_store()?.attempts()?;
    let mut rows: Vec<&Attempt> = attempts
        .iter()
        .filter(|a| args.case.as_deref().is_none_or(|id| a.case_id == id))
        .collect();
    if let Some(limit) = args.limit {
        let skip = rows.len().saturating_sub(limit);
        rows.drain(..skip);
    }

    match ctx.cli.format {
        OutputFormat::Human => {
            if rows.is_empty() {
                if !ctx.cli.quiet {
                    println!("No attempts recorded");
                }
                return Ok(());
            }
            for a in &rows {
                println!(
                    "{}  {:<12} {:<4} {}  {:>3}%  rubric {}/{}",
                    format_ts(a.ts),
                    a.case_id,
                    a.kind.as_str(),
                    if a.letter.is_empty() { "-" } else { a.letter.as_str() },
                    pct(a.similarity),
                    a.rubric_hit,
                    a.rubric_total
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Records => {
            println!("H orals=1 records=1 mode=attempts count={}", rows.len());
            for a in &rows {
                println!(
                    "A {} {} {} letter={} similarity={:.2} rubric={}/{}",
                    a.ts,
                    a.case_id,
                    a.kind.as_str(),
                    a.letter,
                    a.similarity,
                    a.rubric_hit,
                    a.rubric_total
                );
            }
        }
    }
    Ok(())
}

pub fn execute_reset(ctx: &CommandContext, yes: bool) -> Result<()> {
    if !yes {
        bail_usage!("reset deletes every recorded attempt; pass --yes to confirm");
    }
    let store = ctx.progress_store()?;
    let removed = store.reset()?;

    match ctx.cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "removed": removed,
                "path": store.path().display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human | OutputFormat::Records => {
            if !ctx.cli.quiet {
                println!("Removed {} attempts", removed);
            }
        }
    }
    Ok(())
}
