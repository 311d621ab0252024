//! Attach generated summaries to upstream funder records.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use crate::core::models::SummaryOutcome;
use crate::features::summarize::SummaryGenerator;

/// Fields checked, in order, for the organization name of a funder row.
pub const NAME_FIELDS: [&str; 2] = ["name", "funder_name"];

#[must_use]
pub fn funder_name(record: &Value) -> Option<&str> {
    NAME_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_str))
        .filter(|name| !name.trim().is_empty())
}

/// Summarize every funder with at most `concurrency` organizations in flight
/// and write `ai_summary` / `summary_source` into each record.
///
/// Records keep their original order. Each organization's own queries still
/// run one after another.
pub async fn enrich_funders(
    generator: &SummaryGenerator,
    funders: &mut [Value],
    concurrency: usize,
) {
    let names: Vec<Option<String>> = funders
        .iter()
        .map(|record| funder_name(record).map(str::to_string))
        .collect();
    info!(
        "Enriching {} funder record(s) with concurrency {}",
        names.len(),
        concurrency.max(1)
    );

    let outcomes: Vec<SummaryOutcome> = stream::iter(names)
        .map(|name| async move { generator.summarize_opt(name.as_deref()).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    for (record, outcome) in funders.iter_mut().zip(outcomes) {
        attach_outcome(record, &outcome);
    }
}

/// Write the outcome into a record; non-object records are left untouched.
pub fn attach_outcome(record: &mut Value, outcome: &SummaryOutcome) {
    let Some(fields) = record.as_object_mut() else {
        warn!("Skipping funder record that is not a JSON object");
        return;
    };
    fields.insert(
        "ai_summary".to_string(),
        Value::String(outcome.summary.clone()),
    );
    fields.insert(
        "summary_source".to_string(),
        Value::String(outcome.source.clone()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn funder_name_prefers_name_then_funder_name() {
        assert_eq!(funder_name(&json!({"name": "Kresge"})), Some("Kresge"));
        assert_eq!(funder_name(&json!({"funder_name": "Ford"})), Some("Ford"));
        assert_eq!(funder_name(&json!({"name": " ", "funder_name": "Ford"})), None);
        assert_eq!(funder_name(&json!({"name": 7})), None);
    }

    #[test]
    fn attach_outcome_sets_summary_fields() {
        let mut record = json!({"name": "Kresge", "city": "Troy"});
        attach_outcome(&mut record, &SummaryOutcome::generated(" Funds cities. "));

        assert_eq!(record["ai_summary"], "Funds cities.");
        assert_eq!(record["summary_source"], "Web search and AI analysis");
        assert_eq!(record["city"], "Troy");

        let mut not_object = json!(["Kresge"]);
        attach_outcome(&mut not_object, &SummaryOutcome::generated("x"));
        assert_eq!(not_object, json!(["Kresge"]));
    }
}
