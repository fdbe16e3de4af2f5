//! Category totals and recommended next steps.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::evaluator::CriterionResult;
use crate::maturity::percentage;

/// Maximum number of action items surfaced per assessment.
pub const ACTION_ITEM_LIMIT: usize = 3;

/// Check totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    /// Category label.
    pub name: String,
    /// Passing checks.
    pub passed: usize,
    /// Applicable checks.
    pub total: usize,
    /// Rounded pass percentage; `None` when no check in the category applied.
    pub pass_rate: Option<u8>,
}

/// A failing criterion surfaced as a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// Criterion id.
    pub id: String,
    /// Criterion title.
    pub title: String,
    /// What to do.
    pub recommendation: String,
    /// Level of the failing criterion.
    pub level: u8,
}

/// Sum checks per category in first-appearance order.
///
/// Every category shows up, including ones whose criteria were all
/// inapplicable; those keep a total of 0 and no pass rate.
pub fn summarize_categories(results: &[CriterionResult]) -> Vec<CategorySummary> {
    let mut categories: Vec<CategorySummary> = Vec::new();
    for result in results {
        let index = match categories
            .iter()
            .position(|category| category.name == result.category)
        {
            Some(index) => index,
            None => {
                categories.push(CategorySummary {
                    name: result.category.clone(),
                    passed: 0,
                    total: 0,
                    pass_rate: None,
                });
                categories.len() - 1
            }
        };
        if !result.applicable {
            continue;
        }
        let category = &mut categories[index];
        category.passed += result.numerator;
        category.total += result.denominator;
    }

    for category in &mut categories {
        category.pass_rate = percentage(category.passed, category.total);
    }
    categories
}

/// Pick up to [`ACTION_ITEM_LIMIT`] applicable failures, most advanced first.
///
/// Ties keep registry order.
pub fn select_action_items(results: &[CriterionResult]) -> Vec<ActionItem> {
    let mut failing: Vec<&CriterionResult> = results
        .iter()
        .filter(|result| result.applicable && !result.passed)
        .collect();
    failing.sort_by(|a, b| b.level.cmp(&a.level));
    failing
        .into_iter()
        .take(ACTION_ITEM_LIMIT)
        .map(|result| ActionItem {
            id: result.id.clone(),
            title: result.title.clone(),
            recommendation: result.recommendation.clone(),
            level: result.level,
        })
        .collect()
}
