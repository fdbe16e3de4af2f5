//! Scope-aware evaluation of the registry against a signal context.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::criterion::{CheckResult, CheckStatus, Criterion, Registry, Scope, Tier};
use crate::signals::{SignalContext, Target};

/// Verdict for one target, kept for display and audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    /// `.` for the repository, otherwise the subproject's relative path.
    pub target: String,
    /// Verdict for this target.
    pub status: CheckStatus,
    /// Evidence text.
    pub details: String,
}

/// A criterion's results aggregated across all of its targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriterionResult {
    /// Criterion id.
    pub id: String,
    /// Category label.
    pub category: String,
    /// Tier.
    pub tier: Tier,
    /// Numeric level of the tier.
    pub level: u8,
    /// Display title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Recommendation shown when failing.
    pub recommendation: String,
    /// Evaluation scope.
    pub scope: Scope,
    /// Targets that passed.
    pub numerator: usize,
    /// Targets with a definite verdict.
    pub denominator: usize,
    /// Whether at least one target had a definite verdict.
    pub applicable: bool,
    /// Whether every applicable target passed.
    pub passed: bool,
    /// Per-target verdicts in evaluation order.
    pub reasons: Vec<Reason>,
}

impl CriterionResult {
    /// Aggregate per-target verdicts for a criterion.
    ///
    /// Not-applicable reasons count toward neither numerator nor denominator,
    /// and a criterion only passes when every applicable target passed.
    pub fn from_reasons(criterion: &Criterion, reasons: Vec<Reason>) -> Self {
        let numerator = reasons
            .iter()
            .filter(|reason| reason.status == CheckStatus::Pass)
            .count();
        let denominator = reasons
            .iter()
            .filter(|reason| reason.status.is_applicable())
            .count();
        let applicable = denominator > 0;

        Self {
            id: criterion.id.to_string(),
            category: criterion.category.to_string(),
            tier: criterion.tier,
            level: criterion.level(),
            title: criterion.title.to_string(),
            description: criterion.description.to_string(),
            recommendation: criterion.recommendation.to_string(),
            scope: criterion.scope,
            numerator,
            denominator,
            applicable,
            passed: applicable && numerator == denominator,
            reasons,
        }
    }

    /// Aggregate status: not-applicable, pass, or fail.
    pub fn status(&self) -> CheckStatus {
        if !self.applicable {
            CheckStatus::NotApplicable
        } else if self.passed {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        }
    }
}

/// Evaluate one criterion against its targets.
pub fn evaluate_criterion(criterion: &Criterion, ctx: &SignalContext) -> CriterionResult {
    let reasons = match criterion.scope {
        Scope::Repository => {
            let result = criterion.check(&Target::Repository, ctx);
            vec![reason(Target::Repository, result)]
        }
        Scope::Subproject => ctx
            .subprojects
            .iter()
            .map(|subproject| {
                let target = Target::Subproject(subproject);
                let result = criterion.check(&target, ctx);
                reason(target, result)
            })
            .collect(),
    };

    let result = CriterionResult::from_reasons(criterion, reasons);
    log::debug!(
        "criterion {} -> {} ({}/{})",
        result.id,
        result.status(),
        result.numerator,
        result.denominator
    );
    result
}

/// Evaluate every criterion in registry order.
pub fn evaluate(registry: &Registry, ctx: &SignalContext) -> Vec<CriterionResult> {
    registry
        .iter()
        .map(|criterion| evaluate_criterion(criterion, ctx))
        .collect()
}

fn reason(target: Target<'_>, result: CheckResult) -> Reason {
    Reason {
        target: target.id(),
        status: result.status,
        details: result.details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::Predicate;
    use crate::signals::{Ecosystem, Subproject, SubprojectType};
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    fn service_only(target: &Target<'_>, _: &SignalContext) -> CheckResult {
        match target {
            Target::Subproject(subproject) if subproject.kind == SubprojectType::Service => {
                CheckResult::from_bool(
                    subproject.depends_on(&["tracing"]),
                    "uses tracing",
                    "no logging library",
                )
            }
            Target::Subproject(subproject) => {
                CheckResult::not_applicable(format!("{} subproject", subproject.kind))
            }
            Target::Repository => CheckResult::not_applicable("repository"),
        }
    }

    fn has_readme(_: &Target<'_>, ctx: &SignalContext) -> CheckResult {
        CheckResult::from_bool(ctx.has_file("README.md"), "found", "missing")
    }

    fn criterion(id: &'static str, scope: Scope, predicate: Predicate) -> Criterion {
        Criterion {
            id,
            category: "Observability",
            tier: Tier::Intermediate,
            title: id,
            description: "test criterion",
            recommendation: "fix it",
            scope,
            predicate,
        }
    }

    fn subproject(relative_path: &str, kind: SubprojectType, deps: &[&str]) -> Subproject {
        Subproject {
            name: relative_path.to_string(),
            path: PathBuf::from("/repo").join(relative_path),
            relative_path: relative_path.to_string(),
            kind,
            ecosystem: Ecosystem::Cargo,
            dependencies: deps.iter().map(|dep| dep.to_string()).collect::<BTreeSet<_>>(),
        }
    }

    #[test]
    fn repository_scope_runs_once() {
        let ctx = SignalContext {
            files: ["README.md".to_string()].into_iter().collect(),
            subprojects: vec![
                subproject("a", SubprojectType::Library, &[]),
                subproject("b", SubprojectType::Library, &[]),
            ],
            ..SignalContext::default()
        };
        let readme = criterion("readme", Scope::Repository, has_readme);
        let result = evaluate_criterion(&readme, &ctx);

        assert_eq!(result.reasons.len(), 1);
        assert_eq!(result.reasons[0].target, ".");
        assert_eq!((result.numerator, result.denominator), (1, 1));
        assert!(result.passed);
    }

    #[test]
    fn subproject_scope_without_subprojects_is_not_applicable() {
        let result = evaluate_criterion(
            &criterion("logging", Scope::Subproject, service_only),
            &SignalContext::default(),
        );

        assert!(!result.applicable);
        assert!(!result.passed);
        assert_eq!(result.denominator, 0);
        assert!(result.reasons.is_empty());
        assert_eq!(result.status(), CheckStatus::NotApplicable);
    }

    #[test]
    fn type_gated_criterion_skips_non_matching_subprojects() {
        let ctx = SignalContext {
            subprojects: vec![
                subproject("services/api", SubprojectType::Service, &["axum"]),
                subproject("crates/util", SubprojectType::Library, &[]),
            ],
            ..SignalContext::default()
        };
        let logging = criterion("logging", Scope::Subproject, service_only);
        let result = evaluate_criterion(&logging, &ctx);

        assert_eq!(result.reasons.len(), 2);
        assert_eq!(result.reasons[0].target, "services/api");
        assert_eq!(result.reasons[0].status, CheckStatus::Fail);
        assert_eq!(result.reasons[1].target, "crates/util");
        assert_eq!(result.reasons[1].status, CheckStatus::NotApplicable);
        assert_eq!(result.denominator, 1);
        assert_eq!(result.numerator, 0);
        assert!(result.applicable);
        assert!(!result.passed);
    }

    #[test]
    fn partial_subproject_passes_do_not_pass_the_criterion() {
        let ctx = SignalContext {
            subprojects: vec![
                subproject("a", SubprojectType::Service, &["tracing"]),
                subproject("b", SubprojectType::Service, &[]),
            ],
            ..SignalContext::default()
        };
        let logging = criterion("logging", Scope::Subproject, service_only);
        let result = evaluate_criterion(&logging, &ctx);

        assert_eq!((result.numerator, result.denominator), (1, 2));
        assert!(!result.passed);
    }

    #[test]
    fn denominator_matches_applicable_reasons() {
        let ctx = SignalContext {
            subprojects: vec![
                subproject("a", SubprojectType::Service, &["tracing"]),
                subproject("b", SubprojectType::Web, &[]),
                subproject("c", SubprojectType::Service, &[]),
            ],
            ..SignalContext::default()
        };
        let registry = Registry::new(vec![
            criterion("logging", Scope::Subproject, service_only),
            criterion("readme", Scope::Repository, has_readme),
        ])
        .expect("registry");

        for result in evaluate(&registry, &ctx) {
            let applicable = result
                .reasons
                .iter()
                .filter(|reason| reason.status != CheckStatus::NotApplicable)
                .count();
            assert_eq!(result.denominator, applicable);
            assert!(!result.passed || result.applicable);
        }
    }

    #[test]
    fn evaluate_follows_registry_order() {
        let registry = Registry::new(vec![
            criterion("second", Scope::Repository, has_readme),
            criterion("first", Scope::Subproject, service_only),
        ])
        .expect("registry");
        let ids: Vec<String> = evaluate(&registry, &SignalContext::default())
            .into_iter()
            .map(|result| result.id)
            .collect();
        assert_eq!(ids, vec!["second", "first"]);
    }
}
