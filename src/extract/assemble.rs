//! Report assembler: rank, truncate, stamp.

use chrono::{DateTime, TimeZone};

use crate::config::ParsePolicy;
use crate::extract::ParseOutcome;
use crate::report::{MarketReport, Source};

/// Locale-style wall clock, e.g. `10/15/2026, 3:04:05 PM`.
pub fn format_generated_at<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Sort by volume descending (stable, so equal volumes keep extraction order),
/// cap at `policy.keyword_cap()` and package with sources and timestamp.
pub fn assemble_report<Tz: TimeZone>(
    subject: &str,
    summary: String,
    outcome: ParseOutcome,
    sources: Vec<Source>,
    policy: &ParsePolicy,
    now: &DateTime<Tz>,
) -> MarketReport
where
    Tz::Offset: std::fmt::Display,
{
    let ParseOutcome {
        mut candidates,
        tier,
    } = outcome;
    candidates.sort_by(|a, b| b.volume().cmp(&a.volume()));
    candidates.truncate(policy.keyword_cap());

    MarketReport {
        subject: subject.trim().to_string(),
        summary,
        keywords: candidates,
        sources,
        generated_at: format_generated_at(now),
        tier,
    }
}
