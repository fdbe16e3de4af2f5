//! Level gating and overall score.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::criterion::MAX_LEVEL;
use crate::evaluator::CriterionResult;

/// Level credited when no level gate was cleared.
pub const DEFAULT_LEVEL: u8 = 1;

/// Pass statistics for a single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LevelScore {
    /// Level number, 1 to 5.
    pub level: u8,
    /// Applicable criteria at this level that passed.
    pub passed: usize,
    /// Applicable criteria at this level.
    pub total: usize,
    /// Rounded pass percentage, 0 when `total` is 0.
    pub pass_rate: u8,
}

/// Roll-up of all criterion results into a maturity level and score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaturitySummary {
    /// Highest level reached without skipping a failing lower level.
    pub level_achieved: u8,
    /// Rounded percentage of passing checks across all targets.
    pub score: u8,
    /// Passing checks summed over every criterion.
    pub checks_passed: usize,
    /// Applicable checks summed over every criterion.
    pub checks_total: usize,
    /// Criteria that passed on every applicable target.
    pub criteria_passed: usize,
    /// Criteria with at least one applicable target.
    pub criteria_total: usize,
    /// Statistics for levels 1 through 5.
    pub level_scores: Vec<LevelScore>,
}

/// Summarize criterion results.
pub fn summarize(results: &[CriterionResult]) -> MaturitySummary {
    let checks_passed = results.iter().map(|result| result.numerator).sum();
    let checks_total = results.iter().map(|result| result.denominator).sum();
    let criteria_passed = results.iter().filter(|result| result.passed).count();
    let criteria_total = results.iter().filter(|result| result.applicable).count();

    let level_scores = (1..=MAX_LEVEL)
        .map(|level| {
            let (passed, total) = level_counts(results, level);
            LevelScore {
                level,
                passed,
                total,
                pass_rate: percentage(passed, total).unwrap_or(0),
            }
        })
        .collect();

    MaturitySummary {
        level_achieved: level_achieved(results),
        score: percentage(checks_passed, checks_total).unwrap_or(0),
        checks_passed,
        checks_total,
        criteria_passed,
        criteria_total,
        level_scores,
    }
}

/// Walk levels upward and credit each fully passed one; stop at the first
/// level that has an applicable failure. Levels without applicable criteria
/// neither credit nor block.
pub fn level_achieved(results: &[CriterionResult]) -> u8 {
    let mut achieved = None;
    for level in 1..=MAX_LEVEL {
        let (passed, total) = level_counts(results, level);
        if total == 0 {
            continue;
        }
        if passed < total {
            break;
        }
        achieved = Some(level);
    }
    achieved.unwrap_or(DEFAULT_LEVEL)
}

/// Rounded `part / whole` percentage, `None` when `whole` is 0.
pub fn percentage(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    let rate = (part as f64 / whole as f64) * 100.0;
    Some(rate.round().clamp(0.0, 100.0) as u8)
}

fn level_counts(results: &[CriterionResult], level: u8) -> (usize, usize) {
    results
        .iter()
        .filter(|result| result.applicable && result.level == level)
        .fold((0, 0), |(passed, total), result| {
            (passed + usize::from(result.passed), total + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::{CheckStatus, Scope, Tier};
    use crate::evaluator::Reason;
    use CheckStatus::{Fail, NotApplicable as Na, Pass};

    fn result(id: &str, tier: Tier, statuses: &[CheckStatus]) -> CriterionResult {
        let reasons: Vec<Reason> = statuses
            .iter()
            .enumerate()
            .map(|(index, status)| Reason {
                target: format!("target-{index}"),
                status: *status,
                details: String::new(),
            })
            .collect();
        let numerator = reasons
            .iter()
            .filter(|reason| reason.status == CheckStatus::Pass)
            .count();
        let denominator = reasons
            .iter()
            .filter(|reason| reason.status.is_applicable())
            .count();
        CriterionResult {
            id: id.to_string(),
            category: "General".to_string(),
            tier,
            level: tier.level(),
            title: id.to_string(),
            description: String::new(),
            recommendation: String::new(),
            scope: Scope::Subproject,
            numerator,
            denominator,
            applicable: denominator > 0,
            passed: denominator > 0 && numerator == denominator,
            reasons,
        }
    }

    #[test]
    fn failing_basic_blocks_passing_advanced() {
        let results = vec![
            result("basic", Tier::Basic, &[Fail]),
            result("advanced", Tier::Advanced, &[Pass]),
        ];
        assert_eq!(level_achieved(&results), 1);
    }

    #[test]
    fn failing_intermediate_stops_at_default() {
        let results = vec![
            result("b1", Tier::Basic, &[Pass]),
            result("b2", Tier::Basic, &[Pass, Pass]),
            result("i1", Tier::Intermediate, &[Fail]),
            result("a1", Tier::Advanced, &[Na]),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.level_achieved, 1);
        assert_eq!(summary.level_scores[0].pass_rate, 100);
        assert_eq!(summary.level_scores[2].pass_rate, 0);
        assert_eq!(summary.level_scores[4].total, 0);
    }

    #[test]
    fn empty_levels_neither_credit_nor_block() {
        let results = vec![
            result("i1", Tier::Intermediate, &[Pass]),
            result("b1", Tier::Basic, &[Na]),
        ];
        assert_eq!(level_achieved(&results), 3);

        let results = vec![
            result("b1", Tier::Basic, &[Pass]),
            result("i1", Tier::Intermediate, &[Pass]),
            result("a1", Tier::Advanced, &[Pass, Pass]),
        ];
        assert_eq!(level_achieved(&results), 5);
    }

    #[test]
    fn level_never_exceeds_first_failing_level() {
        let results = vec![
            result("b1", Tier::Basic, &[Pass]),
            result("i1", Tier::Intermediate, &[Pass, Fail]),
            result("a1", Tier::Advanced, &[Pass]),
        ];
        assert!(level_achieved(&results) < 3);
    }

    #[test]
    fn no_applicable_criteria_defaults_to_level_one() {
        let results = vec![result("i1", Tier::Intermediate, &[])];
        let summary = summarize(&results);
        assert_eq!(summary.level_achieved, DEFAULT_LEVEL);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.checks_total, 0);
        assert_eq!(summary.criteria_total, 0);
        assert_eq!(summarize(&[]).level_achieved, DEFAULT_LEVEL);
    }

    #[test]
    fn score_counts_checks_while_criteria_are_all_or_nothing() {
        let results = vec![
            result("b1", Tier::Basic, &[Pass, Pass, Fail]),
            result("b2", Tier::Basic, &[Pass, Na]),
        ];
        let summary = summarize(&results);
        assert_eq!(summary.checks_passed, 3);
        assert_eq!(summary.checks_total, 4);
        assert_eq!(summary.score, 75);
        assert_eq!(summary.criteria_passed, 1);
        assert_eq!(summary.criteria_total, 2);
        assert_eq!(summary.level_scores.len(), 5);
        assert_eq!(summary.level_scores[0].passed, 1);
        assert_eq!(summary.level_scores[0].total, 2);
        assert_eq!(summary.level_scores[0].pass_rate, 50);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(2, 3), Some(67));
        assert_eq!(percentage(1, 3), Some(33));
        assert_eq!(percentage(0, 0), None);
    }
}
