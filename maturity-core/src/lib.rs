#![deny(missing_docs)]
//! Maturity core library.
//!
//! Scores a repository's operational maturity: signals are collected once
//! into a [`SignalContext`], every [`Criterion`] in a [`Registry`] is
//! evaluated against the repository or each subproject, and the results roll
//! up into a [`Scorecard`] with a gated maturity level, category totals, and
//! action items.

pub mod catalogue;
pub mod collector;
pub mod criterion;
pub mod error;
pub mod evaluator;
pub mod fs;
pub mod history;
pub mod inspector;
pub mod manifest;
pub mod maturity;
pub mod openapi;
pub mod report;
pub mod rollup;
pub mod scorecard;
pub mod signals;

pub use catalogue::builtin_criteria;
pub use collector::collect_signals;
pub use criterion::{CheckResult, CheckStatus, Criterion, Predicate, Registry, Scope, Tier};
pub use error::{MaturityError, Result};
pub use evaluator::{CriterionResult, Reason, evaluate, evaluate_criterion};
pub use fs::{FileSystem, StdFileSystem};
pub use history::{HistoryEntry, HistoryStore};
pub use inspector::LanguageInspector;
pub use maturity::{LevelScore, MaturitySummary, level_achieved, summarize};
pub use openapi::{ScorecardSchema, schema_json};
pub use report::{
    AssessmentStatus, RepoReport, format_language_stats, render_json, render_markdown,
    render_scorecard_markdown,
};
pub use rollup::{ActionItem, CategorySummary, select_action_items, summarize_categories};
pub use scorecard::{Scorecard, assess};
pub use signals::{
    Ecosystem, LanguageDistribution, SignalContext, Subproject, SubprojectType, Target, Workflow,
};
