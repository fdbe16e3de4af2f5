//! Criterion definitions and the ordered registry that holds them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{MaturityError, Result};
use crate::signals::{SignalContext, Target};

/// Highest maturity level.
pub const MAX_LEVEL: u8 = 5;

/// Ordered maturity tier of a criterion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Foundational practices.
    Basic,
    /// Practices expected of a maintained project.
    Intermediate,
    /// Practices of a mature, automated project.
    Advanced,
}

impl Tier {
    /// Numeric level used for gating. Levels 2 and 4 are reserved.
    pub fn level(self) -> u8 {
        match self {
            Self::Basic => 1,
            Self::Intermediate => 3,
            Self::Advanced => 5,
        }
    }

    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many targets a criterion is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Once, against the repository.
    Repository,
    /// Once per discovered subproject.
    Subproject,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repository => f.write_str("repository"),
            Self::Subproject => f.write_str("subproject"),
        }
    }
}

/// Three-valued verdict of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    /// The practice is in place.
    Pass,
    /// The practice is missing.
    Fail,
    /// The practice does not apply to this target.
    NotApplicable,
}

impl CheckStatus {
    /// Whether the status is a definite verdict.
    pub fn is_applicable(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("pass"),
            Self::Fail => f.write_str("fail"),
            Self::NotApplicable => f.write_str("not-applicable"),
        }
    }
}

/// Verdict of one criterion against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Verdict.
    pub status: CheckStatus,
    /// Human-readable evidence.
    pub details: String,
}

impl CheckResult {
    /// A passing verdict.
    pub fn pass(details: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Pass,
            details: details.into(),
        }
    }

    /// A failing verdict.
    pub fn fail(details: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Fail,
            details: details.into(),
        }
    }

    /// A not-applicable verdict.
    pub fn not_applicable(details: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::NotApplicable,
            details: details.into(),
        }
    }

    /// Pass or fail depending on `condition`.
    pub fn from_bool(
        condition: bool,
        passed: impl Into<String>,
        failed: impl Into<String>,
    ) -> Self {
        if condition {
            Self::pass(passed)
        } else {
            Self::fail(failed)
        }
    }
}

/// A total check function. It must never panic; missing signals map to
/// [`CheckStatus::Fail`] or [`CheckStatus::NotApplicable`].
pub type Predicate = fn(&Target<'_>, &SignalContext) -> CheckResult;

/// A single named maturity check.
#[derive(Clone)]
pub struct Criterion {
    /// Stable unique identifier.
    pub id: &'static str,
    /// Grouping label for roll-ups.
    pub category: &'static str,
    /// Maturity tier.
    pub tier: Tier,
    /// Short display title.
    pub title: &'static str,
    /// What the criterion looks for.
    pub description: &'static str,
    /// What to do when it fails.
    pub recommendation: &'static str,
    /// Evaluation scope.
    pub scope: Scope,
    /// Check function.
    pub predicate: Predicate,
}

impl Criterion {
    /// Numeric level of the criterion's tier.
    pub fn level(&self) -> u8 {
        self.tier.level()
    }

    /// Run the predicate against one target.
    pub fn check(&self, target: &Target<'_>, ctx: &SignalContext) -> CheckResult {
        (self.predicate)(target, ctx)
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Criterion")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("tier", &self.tier)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Ordered catalogue of criteria with unique ids.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    criteria: Vec<Criterion>,
}

impl Registry {
    /// Build a registry, rejecting duplicate ids.
    pub fn new(criteria: Vec<Criterion>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for criterion in &criteria {
            if !seen.insert(criterion.id) {
                return Err(MaturityError::DuplicateCriterion(criterion.id.to_string()));
            }
        }
        Ok(Self { criteria })
    }

    /// The built-in catalogue.
    pub fn builtin() -> Self {
        Self {
            criteria: crate::catalogue::builtin_criteria(),
        }
    }

    /// A copy of this registry without the given ids. Unknown ids are ignored.
    pub fn without(&self, ids: &[String]) -> Self {
        Self {
            criteria: self
                .criteria
                .iter()
                .filter(|criterion| !ids.iter().any(|id| id == criterion.id))
                .cloned()
                .collect(),
        }
    }

    /// Look up a criterion by id.
    pub fn get(&self, id: &str) -> Option<&Criterion> {
        self.criteria.iter().find(|criterion| criterion.id == id)
    }

    /// Criteria in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    /// Number of criteria.
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Whether the registry holds no criteria.
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Criterion;
    type IntoIter = std::slice::Iter<'a, Criterion>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always_pass(_: &Target<'_>, _: &SignalContext) -> CheckResult {
        CheckResult::pass("ok")
    }

    fn criterion(id: &'static str) -> Criterion {
        Criterion {
            id,
            category: "Testing",
            tier: Tier::Basic,
            title: "Always",
            description: "Always passes",
            recommendation: "Nothing to do",
            scope: Scope::Repository,
            predicate: always_pass,
        }
    }

    #[test]
    fn tiers_map_to_gapped_levels() {
        assert_eq!(Tier::Basic.level(), 1);
        assert_eq!(Tier::Intermediate.level(), 3);
        assert_eq!(Tier::Advanced.level(), MAX_LEVEL);
        assert!(Tier::Basic < Tier::Advanced);
    }

    #[test]
    fn registry_rejects_duplicate_ids() {
        let error = Registry::new(vec![criterion("a"), criterion("b"), criterion("a")])
            .expect_err("duplicate");
        assert!(matches!(error, MaturityError::DuplicateCriterion(id) if id == "a"));
    }

    #[test]
    fn registry_preserves_order_and_filters() {
        let registry =
            Registry::new(vec![criterion("a"), criterion("b"), criterion("c")]).expect("registry");
        let ids: Vec<&str> = registry.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        let trimmed = registry.without(&["b".to_string(), "zzz".to_string()]);
        let ids: Vec<&str> = trimmed.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(trimmed.get("b").is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn check_status_serializes_kebab_case() {
        let json = serde_json::to_string(&CheckStatus::NotApplicable).expect("json");
        assert_eq!(json, "\"not-applicable\"");
        assert!(!CheckStatus::NotApplicable.is_applicable());
        assert!(CheckStatus::Fail.is_applicable());
    }

    #[test]
    fn from_bool_selects_message() {
        let result = CheckResult::from_bool(false, "found", "missing");
        assert_eq!(result, CheckResult::fail("missing"));
    }

    #[test]
    fn criterion_runs_predicate() {
        let result = criterion("a").check(&Target::Repository, &SignalContext::default());
        assert_eq!(result.status, CheckStatus::Pass);
    }
}
