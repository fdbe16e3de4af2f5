//! Report formatting utilities for assessment outputs.

use std::fmt::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::criterion::CheckStatus;
use crate::history::HistoryEntry;
use crate::scorecard::Scorecard;
use crate::signals::LanguageDistribution;

/// Outcome of assessing one repository in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum AssessmentStatus {
    /// Signals were collected and scored.
    Assessed,
    /// Collection failed with an error message.
    Failed(String),
}

/// Assessment report for a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoReport {
    /// Repository source as given on the command line.
    pub source: String,
    /// Local path that was inspected.
    pub path: PathBuf,
    /// Whether the assessment ran.
    pub status: AssessmentStatus,
    /// Scorecard for an assessed repository.
    pub scorecard: Option<Scorecard>,
}

impl RepoReport {
    /// Report for a successfully assessed repository.
    pub fn assessed(source: String, scorecard: Scorecard) -> Self {
        Self {
            source,
            path: scorecard.root.clone(),
            status: AssessmentStatus::Assessed,
            scorecard: Some(scorecard),
        }
    }

    /// Report for a repository that could not be assessed.
    pub fn failed(source: String, path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            source,
            path,
            status: AssessmentStatus::Failed(error.into()),
            scorecard: None,
        }
    }
}

/// Render a list of assessment reports as Markdown.
pub fn render_markdown(reports: &[RepoReport]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Maturity Report\n");
    for report in reports {
        let _ = writeln!(output, "## {}\n", report.source);
        let _ = writeln!(output, "- Path: `{}`", report.path.display());
        match (&report.status, &report.scorecard) {
            (AssessmentStatus::Assessed, Some(scorecard)) => {
                append_scorecard(&mut output, scorecard);
            }
            (AssessmentStatus::Failed(error), _) => {
                let _ = writeln!(output, "- Status: failed ({error})\n");
            }
            (AssessmentStatus::Assessed, None) => {
                let _ = writeln!(output, "- Status: no scorecard\n");
            }
        }
    }
    output
}

/// Render a single scorecard as Markdown.
pub fn render_scorecard_markdown(scorecard: &Scorecard) -> String {
    render_markdown(&[RepoReport::assessed(
        scorecard.repository.clone(),
        scorecard.clone(),
    )])
}

/// Render any serializable report payload as JSON.
pub fn render_json<T: Serialize + ?Sized>(payload: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(payload)
}

/// Format language stats sorted by percentage.
pub fn format_language_stats(stats: &LanguageDistribution) -> Vec<(String, f64)> {
    let mut items: Vec<(String, f64)> = stats.iter().map(|(k, v)| (k.clone(), *v)).collect();
    items.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    items
}

/// Short label for a criterion status; not-applicable is `n/a`.
pub fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "pass",
        CheckStatus::Fail => "fail",
        CheckStatus::NotApplicable => "n/a",
    }
}

/// Percentage for display, `no data` when nothing was measured.
pub fn format_rate(rate: Option<u8>) -> String {
    match rate {
        Some(rate) => format!("{rate}%"),
        None => "no data".to_string(),
    }
}

/// Message shown when there is nothing left to fix.
pub const ALL_PASSED: &str = "All applicable criteria passed.";

fn append_scorecard(output: &mut String, scorecard: &Scorecard) {
    let maturity = &scorecard.maturity;
    let _ = writeln!(output, "- Status: assessed");
    let _ = writeln!(
        output,
        "- Generated: {}",
        scorecard.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output, "- Level: {} of 5", maturity.level_achieved);
    let _ = writeln!(
        output,
        "- Score: {}% ({}/{} checks)",
        maturity.score, maturity.checks_passed, maturity.checks_total
    );
    let _ = writeln!(
        output,
        "- Criteria passed: {}/{}\n",
        maturity.criteria_passed, maturity.criteria_total
    );

    append_language_stats(output, &scorecard.languages);
    append_subprojects(output, scorecard);
    append_levels(output, scorecard);
    append_categories(output, scorecard);
    append_criteria(output, scorecard);
    append_action_items(output, scorecard);
    append_history(output, &scorecard.history, scorecard);
}

fn append_language_stats(output: &mut String, stats: &LanguageDistribution) {
    if stats.is_empty() {
        let _ = writeln!(output, "### Languages\nNo languages detected.\n");
        return;
    }
    let _ = writeln!(output, "### Languages");
    for (language, percent) in format_language_stats(stats) {
        let _ = writeln!(output, "- {language}: {percent:.2}%");
    }
    let _ = writeln!(output);
}

fn append_subprojects(output: &mut String, scorecard: &Scorecard) {
    if scorecard.subprojects.is_empty() {
        let _ = writeln!(output, "### Subprojects\nNo subprojects detected.\n");
        return;
    }
    let _ = writeln!(output, "### Subprojects");
    let _ = writeln!(output, "| Path | Name | Type | Ecosystem |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for subproject in &scorecard.subprojects {
        let _ = writeln!(
            output,
            "| `{}` | {} | {} | {:?} |",
            subproject.relative_path, subproject.name, subproject.kind, subproject.ecosystem
        );
    }
    let _ = writeln!(output);
}

fn append_levels(output: &mut String, scorecard: &Scorecard) {
    let _ = writeln!(output, "### Levels");
    let _ = writeln!(output, "| Level | Passed | Total | Pass rate |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for level in &scorecard.maturity.level_scores {
        if level.total == 0 {
            let _ = writeln!(output, "| {} | 0 | 0 | n/a |", level.level);
        } else {
            let _ = writeln!(
                output,
                "| {} | {} | {} | {}% |",
                level.level, level.passed, level.total, level.pass_rate
            );
        }
    }
    let _ = writeln!(output);
}

fn append_categories(output: &mut String, scorecard: &Scorecard) {
    let _ = writeln!(output, "### Categories");
    let _ = writeln!(output, "| Category | Passed | Total | Pass rate |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    for category in &scorecard.categories {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            category.name,
            category.passed,
            category.total,
            format_rate(category.pass_rate)
        );
    }
    let _ = writeln!(output);
}

fn append_criteria(output: &mut String, scorecard: &Scorecard) {
    let _ = writeln!(output, "### Criteria");
    let _ = writeln!(output, "| Status | Level | Criterion | Category | Checks |");
    let _ = writeln!(output, "| --- | --- | --- | --- | --- |");
    for result in &scorecard.criteria {
        let checks = if result.applicable {
            format!("{}/{}", result.numerator, result.denominator)
        } else {
            "n/a".to_string()
        };
        let _ = writeln!(
            output,
            "| {} | {} | {} (`{}`) | {} | {} |",
            status_label(result.status()),
            result.level,
            result.title,
            result.id,
            result.category,
            checks
        );
    }
    let _ = writeln!(output);

    let failures: Vec<String> = scorecard
        .criteria
        .iter()
        .flat_map(|result| {
            result
                .reasons
                .iter()
                .filter(|reason| reason.status == CheckStatus::Fail)
                .map(move |reason| {
                    format!(
                        "`{}` on `{}`: {}",
                        result.id, reason.target, reason.details
                    )
                })
        })
        .collect();
    if !failures.is_empty() {
        let _ = writeln!(output, "### Failing checks");
        for failure in failures {
            let _ = writeln!(output, "- {failure}");
        }
        let _ = writeln!(output);
    }
}

fn append_action_items(output: &mut String, scorecard: &Scorecard) {
    if scorecard.action_items.is_empty() {
        let _ = writeln!(output, "### Action items\n{ALL_PASSED}\n");
        return;
    }
    let _ = writeln!(output, "### Action items");
    for (index, item) in scorecard.action_items.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. **{}** (level {}): {}",
            index + 1,
            item.title,
            item.level,
            item.recommendation
        );
    }
    let _ = writeln!(output);
}

fn append_history(output: &mut String, history: &[HistoryEntry], scorecard: &Scorecard) {
    if history.is_empty() {
        return;
    }
    let _ = writeln!(output, "### History");
    let _ = writeln!(output, "| Run | Level | Score | Change |");
    let _ = writeln!(output, "| --- | --- | --- | --- |");
    let current = HistoryEntry::from_scorecard(scorecard);
    let mut previous: Option<u8> = None;
    for (index, entry) in history.iter().chain(std::iter::once(&current)).enumerate() {
        let label = if index == history.len() {
            "current".to_string()
        } else {
            entry.timestamp.format("%Y-%m-%d %H:%M").to_string()
        };
        let change = match previous {
            Some(before) => format!("{:+}", i16::from(entry.score) - i16::from(before)),
            None => "-".to_string(),
        };
        let _ = writeln!(
            output,
            "| {label} | {} | {}% | {change} |",
            entry.level_achieved, entry.score
        );
        previous = Some(entry.score);
    }
    let _ = writeln!(output);
}
