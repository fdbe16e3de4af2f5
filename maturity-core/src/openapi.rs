//! OpenAPI component schemas for the scorecard payload.

use utoipa::OpenApi;

use crate::criterion::{CheckStatus, Scope, Tier};
use crate::evaluator::{CriterionResult, Reason};
use crate::history::HistoryEntry;
use crate::maturity::{LevelScore, MaturitySummary};
use crate::rollup::{ActionItem, CategorySummary};
use crate::scorecard::Scorecard;
use crate::signals::{Ecosystem, Subproject, SubprojectType};

/// Schema document for everything `maturity assess --format json` emits.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Repository maturity scorecard",
        description = "Result of scoring a repository against the maturity criteria."
    ),
    components(
        schemas(
            Scorecard,
            MaturitySummary,
            LevelScore,
            CategorySummary,
            ActionItem,
            CriterionResult,
            Reason,
            CheckStatus,
            Tier,
            Scope,
            Subproject,
            SubprojectType,
            Ecosystem,
            HistoryEntry
        )
    )
)]
pub struct ScorecardSchema;

/// Pretty-printed OpenAPI document.
pub fn schema_json() -> Result<String, serde_json::Error> {
    ScorecardSchema::openapi().to_pretty_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_scorecard_components() {
        let doc: serde_json::Value =
            serde_json::from_str(&schema_json().expect("schema")).expect("parse");
        let schemas = &doc["components"]["schemas"];
        for name in ["Scorecard", "CriterionResult", "CheckStatus", "HistoryEntry"] {
            assert!(schemas.get(name).is_some(), "missing schema {name}");
        }
        assert_eq!(doc["info"]["title"], "Repository maturity scorecard");
    }

    #[test]
    fn check_status_schema_uses_wire_names() {
        let doc = serde_json::to_value(ScorecardSchema::openapi()).expect("json");
        let variants = doc["components"]["schemas"]["CheckStatus"]["enum"]
            .as_array()
            .cloned()
            .unwrap_or_default();
        assert!(variants.contains(&serde_json::Value::from("not-applicable")));
    }
}
