//! The complete result of one assessment.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::criterion::Registry;
use crate::evaluator::{CriterionResult, evaluate};
use crate::history::HistoryEntry;
use crate::maturity::{MaturitySummary, summarize};
use crate::rollup::{ActionItem, CategorySummary, select_action_items, summarize_categories};
use crate::signals::{LanguageDistribution, SignalContext, Subproject};

/// Structured assessment result handed to renderers and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scorecard {
    /// Repository display name.
    pub repository: String,
    /// Repository root on disk.
    #[schema(value_type = String)]
    pub root: PathBuf,
    /// When the assessment ran.
    pub generated_at: DateTime<Utc>,
    /// Detected languages by share of lines.
    #[schema(value_type = Object)]
    pub languages: LanguageDistribution,
    /// Discovered subprojects.
    pub subprojects: Vec<Subproject>,
    /// Level and score roll-up.
    pub maturity: MaturitySummary,
    /// Per-category totals.
    pub categories: Vec<CategorySummary>,
    /// Per-criterion results in registry order.
    pub criteria: Vec<CriterionResult>,
    /// Most relevant failing criteria.
    pub action_items: Vec<ActionItem>,
    /// Earlier runs, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl Scorecard {
    /// Look up a criterion result by id.
    pub fn criterion(&self, id: &str) -> Option<&CriterionResult> {
        self.criteria.iter().find(|result| result.id == id)
    }
}

/// Evaluate a registry against collected signals and roll up the results.
pub fn assess(
    registry: &Registry,
    ctx: &SignalContext,
    history: Vec<HistoryEntry>,
    generated_at: DateTime<Utc>,
) -> Scorecard {
    let criteria = evaluate(registry, ctx);
    let maturity = summarize(&criteria);
    let categories = summarize_categories(&criteria);
    let action_items = select_action_items(&criteria);

    log::info!(
        "assessed {}: level {} with score {}% ({}/{} checks)",
        ctx.name,
        maturity.level_achieved,
        maturity.score,
        maturity.checks_passed,
        maturity.checks_total
    );

    Scorecard {
        repository: ctx.name.clone(),
        root: ctx.root.clone(),
        generated_at,
        languages: ctx.languages.clone(),
        subprojects: ctx.subprojects.clone(),
        maturity,
        categories,
        criteria,
        action_items,
        history,
    }
}
