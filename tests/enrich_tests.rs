mod common;

use common::test_config;
use funder_insight::features::summarize::MISSING_NAME_ERROR;
use funder_insight::features::{SummaryGenerator, enrich_funders};
use httpmock::{Method::GET, Method::POST, MockServer};
use serde_json::json;

#[tokio::test]
async fn enrich_funders_attaches_summaries_in_order() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(500);
        })
        .await;
    let completion = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(json!({
                "choices": [{"message": {"content": "A community funder."}}]
            }));
        })
        .await;

    let generator = SummaryGenerator::new(&test_config(&server)).expect("generator");
    let mut funders = vec![
        json!({"name": "Kresge Foundation", "city": "Troy"}),
        json!({"id": 17}),
        json!({"funder_name": "Ford Foundation"}),
    ];

    enrich_funders(&generator, &mut funders, 2).await;

    completion.assert_hits_async(2).await;
    assert_eq!(funders[0]["ai_summary"], "A community funder.");
    assert_eq!(funders[0]["summary_source"], "Web search and AI analysis");
    assert_eq!(funders[0]["city"], "Troy");
    assert_eq!(funders[1]["ai_summary"], MISSING_NAME_ERROR);
    assert_eq!(funders[1]["summary_source"], "");
    assert_eq!(funders[2]["ai_summary"], "A community funder.");
}
