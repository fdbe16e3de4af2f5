#![deny(missing_docs)]
//! Maturity command-line interface.
//!
//! Scores local repositories, lists the criteria catalogue, and prints the
//! scorecard schema.

use chrono::Utc;
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use maturity_core::report::{ALL_PASSED, format_rate, status_label};
use maturity_core::{
    AssessmentStatus, HistoryEntry, HistoryStore, Registry, RepoReport, Scope, Scorecard,
    StdFileSystem, Tier, assess, collect_signals, format_language_stats, render_json,
    render_markdown, schema_json,
};
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "maturity", version, about = "Repository maturity scoring")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["dir", "path"])
))]
struct RepoSourceArgs {
    /// Directory containing repositories to assess.
    #[arg(long)]
    dir: Option<PathBuf>,
    /// Local repository path to assess.
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, env = "MATURITY_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum ListFormat {
    Text,
    Json,
}

#[derive(Args, Clone)]
struct AssessArgs {
    /// History file; prior runs feed the trend and this run is appended.
    #[arg(long, env = "MATURITY_HISTORY")]
    history: Option<PathBuf>,
    /// Criterion IDs to leave out (repeatable or comma-separated).
    #[arg(long, value_delimiter = ',', env = "MATURITY_SKIP")]
    skip: Vec<String>,
    /// Maximum number of repositories assessed at once.
    #[arg(short = 'j', long, env = "MATURITY_CONCURRENCY", default_value_t = 5)]
    concurrency: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a repository, or every repository in a directory.
    Assess {
        #[command(flatten)]
        source: RepoSourceArgs,
        #[command(flatten)]
        options: AssessArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// List the built-in criteria.
    Criteria {
        /// Output format for the catalogue.
        #[arg(long, value_enum, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
    /// Print the OpenAPI schema of the scorecard types.
    Schema,
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Assess {
            source,
            options,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            run_assess(source, options, report).await?
        }
        Commands::Criteria { format } => {
            print!("{}", render_criteria(&Registry::builtin(), format)?);
        }
        Commands::Schema => {
            println!("{}", schema_json()?);
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

#[cfg(not(test))]
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

async fn run_assess(source: BatchSource, options: AssessArgs, report: OutputArgs) -> CliResult<()> {
    let history = match (&options.history, &source) {
        (Some(_), BatchSource::Dir(_)) => {
            return Err("--history can only be used with a single --path".into());
        }
        (Some(path), BatchSource::Path(_)) => Some(HistoryStore::new(path.clone())),
        (None, _) => None,
    };

    let targets = load_repo_targets(source).await?;
    if targets.is_empty() {
        println!("No repositories found to assess.");
        return Ok(());
    }

    let registry = Arc::new(build_registry(&options.skip));
    let prior = match &history {
        Some(store) => store.load()?,
        None => Vec::new(),
    };

    let concurrency = if options.concurrency == 0 {
        1
    } else {
        options.concurrency
    };
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();

    for path in targets {
        let permit = semaphore.clone().acquire_owned().await?;
        let registry = registry.clone();
        let prior = prior.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            assess_local(path, &registry, prior)
        });
    }

    let mut reports = Vec::new();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(report) => reports.push(report),
            Err(err) => reports.push(repo_report_from_task_error(err)),
        }
    }
    reports.sort_by(|a, b| a.path.cmp(&b.path));

    emit_assess_reports(&reports, &report).await?;

    if let Some(store) = history {
        if let Some(scorecard) = reports.iter().find_map(|report| report.scorecard.as_ref()) {
            let entries = store.append(HistoryEntry::from_scorecard(scorecard))?;
            log::info!(
                "recorded run {} in {}",
                entries.len(),
                store.path().display()
            );
        }
    }

    Ok(())
}

fn build_registry(skip: &[String]) -> Registry {
    let builtin = Registry::builtin();
    for id in skip {
        if builtin.get(id).is_none() {
            log::warn!("ignoring unknown criterion id {id}");
        }
    }
    builtin.without(skip)
}

fn resolve_source_args(source: &RepoSourceArgs) -> CliResult<BatchSource> {
    if let Some(dir) = source.dir.clone() {
        return Ok(BatchSource::Dir(dir));
    }
    if let Some(path) = source.path.clone() {
        return Ok(BatchSource::Path(path));
    }
    Err("no repository source provided".into())
}

async fn load_repo_paths_from_dir(path: &Path) -> CliResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(path).await?;
    let mut repos = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if !file_type.is_dir() {
            continue;
        }
        let entry_path = entry.path();
        if is_hidden_path(&entry_path) {
            continue;
        }
        repos.push(entry_path);
    }
    repos.sort();
    Ok(repos)
}

fn is_hidden_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

async fn load_repo_targets(source: BatchSource) -> CliResult<Vec<PathBuf>> {
    match source {
        BatchSource::Dir(dir) => load_repo_paths_from_dir(&dir).await,
        BatchSource::Path(path) => Ok(vec![path]),
    }
}

enum BatchSource {
    Dir(PathBuf),
    Path(PathBuf),
}

fn assess_local(path: PathBuf, registry: &Registry, history: Vec<HistoryEntry>) -> RepoReport {
    let source = path.display().to_string();
    if !path.is_dir() {
        let message = format!("path not found: {}", path.display());
        return RepoReport::failed(source, path, message);
    }

    let root = match path.canonicalize() {
        Ok(root) => root,
        Err(err) => return RepoReport::failed(source, path, err.to_string()),
    };

    match collect_signals(&StdFileSystem::new(), &root) {
        Ok(ctx) => RepoReport::assessed(source, assess(registry, &ctx, history, Utc::now())),
        Err(err) => {
            log::warn!("could not assess {}: {err}", root.display());
            RepoReport::failed(source, root, err.to_string())
        }
    }
}

fn repo_report_from_task_error(error: tokio::task::JoinError) -> RepoReport {
    RepoReport::failed("unknown".to_string(), PathBuf::from("."), error.to_string())
}

async fn emit_assess_reports(reports: &[RepoReport], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_assess_text(reports),
        OutputFormat::Markdown => render_markdown(reports),
        OutputFormat::Json => render_json(reports)?,
    };
    emit_output(output, contents).await
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

fn render_assess_text(reports: &[RepoReport]) -> String {
    let mut output = String::new();
    for report in reports {
        let _ = writeln!(output, "Source: {}", report.source);
        let _ = writeln!(output, "Path: {}", report.path.display());
        match (&report.status, &report.scorecard) {
            (AssessmentStatus::Assessed, Some(scorecard)) => {
                let _ = writeln!(output, "Status: assessed");
                render_scorecard_text(&mut output, scorecard);
            }
            (AssessmentStatus::Assessed, None) => {
                let _ = writeln!(output, "Status: no scorecard");
            }
            (AssessmentStatus::Failed(error), _) => {
                let _ = writeln!(output, "Status: failed ({error})");
            }
        }
        let _ = writeln!(output);
    }
    output
}

fn render_scorecard_text(output: &mut String, scorecard: &Scorecard) {
    let maturity = &scorecard.maturity;
    let _ = writeln!(output, "Level: {} of 5", maturity.level_achieved);
    let _ = writeln!(
        output,
        "Score: {}% ({}/{} checks)",
        maturity.score, maturity.checks_passed, maturity.checks_total
    );

    if scorecard.languages.is_empty() {
        let _ = writeln!(output, "Languages: none detected");
    } else {
        let _ = writeln!(output, "Languages:");
        for (language, percent) in format_language_stats(&scorecard.languages) {
            let _ = writeln!(output, "- {language}: {percent:.2}%");
        }
    }

    if scorecard.subprojects.is_empty() {
        let _ = writeln!(output, "Subprojects: none");
    } else {
        let _ = writeln!(output, "Subprojects:");
        for subproject in &scorecard.subprojects {
            let _ = writeln!(
                output,
                "- {} ({}, {:?})",
                subproject.relative_path, subproject.kind, subproject.ecosystem
            );
        }
    }

    let _ = writeln!(output, "Categories:");
    for category in &scorecard.categories {
        let _ = writeln!(
            output,
            "- {}: {} ({}/{})",
            category.name,
            format_rate(category.pass_rate),
            category.passed,
            category.total
        );
    }

    let _ = writeln!(output, "Criteria:");
    for result in &scorecard.criteria {
        let _ = writeln!(
            output,
            "- [{}] {} (level {}): {}/{}",
            status_label(result.status()),
            result.id,
            result.level,
            result.numerator,
            result.denominator
        );
    }

    if scorecard.action_items.is_empty() {
        let _ = writeln!(output, "Action items: {ALL_PASSED}");
    } else {
        let _ = writeln!(output, "Action items:");
        for (index, item) in scorecard.action_items.iter().enumerate() {
            let _ = writeln!(
                output,
                "{}. {} (level {}): {}",
                index + 1,
                item.title,
                item.level,
                item.recommendation
            );
        }
    }

    if !scorecard.history.is_empty() {
        let _ = writeln!(output, "History:");
        for entry in &scorecard.history {
            let _ = writeln!(
                output,
                "- {}: level {}, score {}%",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.level_achieved,
                entry.score
            );
        }
        let _ = writeln!(
            output,
            "- current: level {}, score {}%",
            maturity.level_achieved, maturity.score
        );
    }
}

/// Catalogue row printed by `maturity criteria`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct CriterionInfo {
    id: &'static str,
    category: &'static str,
    tier: Tier,
    level: u8,
    scope: Scope,
    title: &'static str,
    description: &'static str,
    recommendation: &'static str,
}

fn criteria_rows(registry: &Registry) -> Vec<CriterionInfo> {
    registry
        .iter()
        .map(|criterion| CriterionInfo {
            id: criterion.id,
            category: criterion.category,
            tier: criterion.tier,
            level: criterion.level(),
            scope: criterion.scope,
            title: criterion.title,
            description: criterion.description,
            recommendation: criterion.recommendation,
        })
        .collect()
}

fn render_criteria(registry: &Registry, format: ListFormat) -> CliResult<String> {
    let rows = criteria_rows(registry);
    match format {
        ListFormat::Json => Ok(render_json(&rows)?),
        ListFormat::Text => {
            let mut output = String::new();
            for row in &rows {
                let _ = writeln!(
                    output,
                    "{:<22} level {}  {:<10}  {:<13}  {}",
                    row.id, row.level, row.scope, row.category, row.title
                );
            }
            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AssessArgs, BatchSource, ListFormat, OutputArgs, OutputFormat, RepoSourceArgs,
        assess_local, build_registry, emit_assess_reports, load_repo_paths_from_dir,
        load_repo_targets, render_assess_text, render_criteria, resolve_source_args, run_assess,
    };
    use chrono::{TimeZone, Utc};
    use maturity_core::{
        AssessmentStatus, HistoryEntry, HistoryStore, Registry, RepoReport, report::ALL_PASSED,
    };
    use std::path::PathBuf;

    static UNIQUE_COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("maturity_cli_test_{nanos}_{counter}"))
    }

    fn temp_repo_with_files(files: &[(&str, &str)]) -> PathBuf {
        let root = std::env::temp_dir().join(unique_dir_name());
        for (rel_path, contents) in files {
            let file_path = root.join(rel_path);
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent).expect("create dir");
            }
            std::fs::write(&file_path, contents).expect("write file");
        }
        root
    }

    const README: &str = "# demo\n\nA small repository used to exercise the maturity command line. \
It has no manifest, so only the repository-wide criteria apply to it and every \
subproject check is reported as not applicable.\n";

    fn options(history: Option<PathBuf>) -> AssessArgs {
        AssessArgs {
            history,
            skip: Vec::new(),
            concurrency: 2,
        }
    }

    fn json_output(path: PathBuf) -> OutputArgs {
        OutputArgs {
            format: OutputFormat::Json,
            report_output: Some(path),
        }
    }

    #[test]
    fn resolve_source_prefers_dir_over_path() {
        let args = RepoSourceArgs {
            dir: Some(PathBuf::from("repos")),
            path: Some(PathBuf::from("repo")),
        };

        let source = resolve_source_args(&args).expect("source");
        match source {
            BatchSource::Dir(path) => assert_eq!(path, PathBuf::from("repos")),
            _ => panic!("expected dir source"),
        }
    }

    #[test]
    fn resolve_source_errors_when_missing() {
        let missing = RepoSourceArgs {
            dir: None,
            path: None,
        };
        assert!(resolve_source_args(&missing).is_err());
    }

    #[tokio::test]
    async fn load_repo_paths_from_dir_filters_hidden() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let repo_a = root.join("repo-a");
        let repo_b = root.join("repo-b");
        let hidden = root.join(".hidden");
        std::fs::create_dir_all(&repo_a).expect("repo a");
        std::fs::create_dir_all(&repo_b).expect("repo b");
        std::fs::create_dir_all(&hidden).expect("hidden dir");
        std::fs::write(root.join("notes.txt"), "data").expect("file");

        let repos = load_repo_paths_from_dir(&root).await.expect("repos");

        assert_eq!(repos, vec![repo_a.clone(), repo_b]);

        let single = load_repo_targets(BatchSource::Path(repo_a.clone()))
            .await
            .expect("path targets");
        assert_eq!(single, vec![repo_a]);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn build_registry_drops_skipped_ids() {
        let registry = build_registry(&["readme".to_string(), "no-such-check".to_string()]);

        assert!(registry.get("readme").is_none());
        assert_eq!(registry.len(), Registry::builtin().len() - 1);
    }

    #[test]
    fn assess_local_fails_when_missing() {
        let missing = std::env::temp_dir().join(unique_dir_name());

        let report = assess_local(missing, &Registry::builtin(), Vec::new());

        assert!(matches!(report.status, AssessmentStatus::Failed(_)));
        assert!(report.scorecard.is_none());
    }

    #[test]
    fn assess_local_scores_a_repository() {
        let repo = temp_repo_with_files(&[
            ("README.md", "# demo\n"),
            ("Cargo.toml", "[package]\nname = \"demo\"\n"),
            ("src/lib.rs", "pub fn demo() {}\n"),
        ]);

        let report = assess_local(repo.clone(), &Registry::builtin(), Vec::new());

        assert_eq!(report.status, AssessmentStatus::Assessed);
        let scorecard = report.scorecard.expect("scorecard");
        assert_eq!(scorecard.subprojects.len(), 1);
        assert_eq!(scorecard.subprojects[0].name, "demo");
        assert!(scorecard.languages.contains_key("Rust"));

        std::fs::remove_dir_all(&repo).expect("cleanup repo");
    }

    #[test]
    fn render_assess_text_covers_branches() {
        let repo = temp_repo_with_files(&[("README.md", README)]);
        let mut assessed = assess_local(repo.clone(), &Registry::builtin(), Vec::new());
        if let Some(scorecard) = assessed.scorecard.as_mut() {
            scorecard.history = vec![HistoryEntry {
                timestamp: Utc
                    .with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
                    .single()
                    .expect("timestamp"),
                level_achieved: 1,
                score: 10,
            }];
        }
        let failed = RepoReport::failed(
            "broken".to_string(),
            PathBuf::from("/tmp/broken"),
            "oops".to_string(),
        );

        let output = render_assess_text(&[assessed, failed]);

        assert!(output.contains("Status: assessed"));
        assert!(output.contains("Level: 1 of 5"));
        assert!(output.contains("Subprojects: none"));
        assert!(output.contains("[pass] readme"));
        assert!(output.contains("[n/a] tests-present"));
        assert!(output.contains("no data"));
        assert!(output.contains("- 2026-03-01 09:30: level 1, score 10%"));
        assert!(output.contains("- current: level 1"));
        assert!(output.contains("Status: failed (oops)"));
        assert!(!output.contains(ALL_PASSED));

        std::fs::remove_dir_all(&repo).expect("cleanup repo");
    }

    #[test]
    fn render_criteria_lists_the_catalogue() {
        let registry = Registry::builtin();

        let text = render_criteria(&registry, ListFormat::Text).expect("text");
        assert_eq!(text.lines().count(), registry.len());
        assert!(text.lines().next().expect("first row").starts_with("readme"));

        let json = render_criteria(&registry, ListFormat::Json).expect("json");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("parse");
        let rows = parsed.as_array().expect("array");
        assert_eq!(rows.len(), registry.len());
        assert_eq!(rows[0]["id"], "readme");
        assert_eq!(rows[0]["level"], 1);
        assert_eq!(rows[0]["scope"], "repository");
    }

    #[tokio::test]
    async fn emit_reports_support_formats() {
        let root = std::env::temp_dir().join(unique_dir_name());
        let report = RepoReport::failed(
            "repo".to_string(),
            PathBuf::from("/tmp/repo"),
            "missing".to_string(),
        );

        let markdown_path = root.join("out/report.md");
        let output = OutputArgs {
            format: OutputFormat::Markdown,
            report_output: Some(markdown_path.clone()),
        };
        emit_assess_reports(std::slice::from_ref(&report), &output)
            .await
            .expect("emit markdown");
        let contents = std::fs::read_to_string(&markdown_path).expect("read markdown");
        assert!(contents.contains("# Maturity Report"));

        let json_path = root.join("out/report.json");
        emit_assess_reports(std::slice::from_ref(&report), &json_output(json_path.clone()))
            .await
            .expect("emit json");
        let contents = std::fs::read_to_string(&json_path).expect("read json");
        assert!(contents.contains("\"status\""));

        let output = OutputArgs {
            format: OutputFormat::Text,
            report_output: None,
        };
        emit_assess_reports(&[report], &output)
            .await
            .expect("emit text");

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_assess_scores_every_repository_in_a_dir() {
        let root = temp_repo_with_files(&[
            ("batch/alpha/README.md", "# alpha\n"),
            ("batch/beta/package.json", "{\"name\": \"beta\"}"),
        ]);
        let report_path = root.join("out/batch.json");

        run_assess(
            BatchSource::Dir(root.join("batch")),
            options(None),
            json_output(report_path.clone()),
        )
        .await
        .expect("assess dir");

        let contents = std::fs::read_to_string(&report_path).expect("read report");
        let reports: Vec<RepoReport> = serde_json::from_str(&contents).expect("parse reports");
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.status == AssessmentStatus::Assessed));
        assert!(reports[0].path.ends_with("alpha"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn run_assess_rejects_history_for_a_dir() {
        let root = std::env::temp_dir().join(unique_dir_name());

        let result = run_assess(
            BatchSource::Dir(root.clone()),
            options(Some(root.join("history.json"))),
            json_output(root.join("out.json")),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn run_assess_appends_history() {
        let repo = temp_repo_with_files(&[("README.md", "# demo\n")]);
        let history_path = repo.join(".maturity/history.json");

        for _ in 0..2 {
            run_assess(
                BatchSource::Path(repo.clone()),
                options(Some(history_path.clone())),
                json_output(repo.join("out/report.json")),
            )
            .await
            .expect("assess with history");
        }

        let entries = HistoryStore::new(history_path).load().expect("history");
        assert_eq!(entries.len(), 2);

        let contents = std::fs::read_to_string(repo.join("out/report.json")).expect("report");
        let reports: Vec<RepoReport> = serde_json::from_str(&contents).expect("parse");
        let scorecard = reports[0].scorecard.as_ref().expect("scorecard");
        assert_eq!(scorecard.history.len(), 1);
        assert_eq!(scorecard.history[0], entries[0]);

        std::fs::remove_dir_all(&repo).expect("cleanup repo");
    }
}
