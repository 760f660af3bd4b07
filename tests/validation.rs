//! Validator behavior against a mock webhook and mock platform records.

use marquee::SetupError;
use marquee::platform::PlatformClient;
use marquee::record::ProvisionRecord;
use marquee::validate::{
    CHECK_AGENT_RECORD, CHECK_LIVE_ENDPOINT, CHECK_TOOL_RECORD, CheckStatus, LIVE_QUERY_SHAPES,
    Validator,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record_for(server: &MockServer, tool_id: &str, agent_id: &str) -> ProvisionRecord {
    ProvisionRecord::new(tool_id.to_string(), agent_id.to_string(), server.uri())
}

#[test]
fn validation_without_record_fails_before_any_remote_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent_config.json");
    // The record gate comes before any client is even constructed, so a
    // missing file means zero remote calls by construction.
    match ProvisionRecord::load(&path) {
        Err(SetupError::MissingLocalRecord { .. }) => {}
        other => panic!("expected MissingLocalRecord, got {other:?}"),
    }
}

#[tokio::test]
async fn live_endpoint_check_passes_and_captures_result_counts() {
    let webhook = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/showtimes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query_info": { "results_count": 5 },
            "conversational_summary": "Found 5 movies playing today in Miami."
        })))
        .expect(LIVE_QUERY_SHAPES.len() as u64)
        .mount(&webhook)
        .await;

    let client = PlatformClient::new(&webhook.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator.check_live_endpoint(&webhook.uri()).await;

    assert_eq!(result.status, CheckStatus::Pass);
    assert!(result.detail.contains("5 showtimes"));
    assert!(result.detail.contains("Found 5 movies"));
    // One line per representative query shape.
    assert_eq!(result.detail.lines().count(), LIVE_QUERY_SHAPES.len());
}

#[tokio::test]
async fn weekend_probe_sends_exactly_that_parameter_and_keeps_failure_body() {
    let webhook = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/showtimes"))
        .and(query_param("day_type", "weekend"))
        .and(query_param_is_missing("date"))
        .and(query_param_is_missing("movie_title"))
        .and(query_param_is_missing("time_preference"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(1)
        .mount(&webhook)
        .await;

    let client = PlatformClient::new(&webhook.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator
        .check_live_endpoint_with(&webhook.uri(), &[&[("day_type", "weekend")]])
        .await;

    assert_eq!(result.status, CheckStatus::Fail);
    assert!(result.detail.contains("upstream exploded"));
}

#[tokio::test]
async fn non_json_body_fails_the_case_but_the_run_continues() {
    let webhook = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/showtimes"))
        .and(query_param("day_type", "today"))
        .and(query_param_is_missing("time_preference"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&webhook)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/showtimes"))
        .and(query_param("day_type", "tomorrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query_info": { "results_count": 3 }
        })))
        .expect(1)
        .mount(&webhook)
        .await;

    let client = PlatformClient::new(&webhook.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator
        .check_live_endpoint_with(
            &webhook.uri(),
            &[&[("day_type", "today")], &[("day_type", "tomorrow")]],
        )
        .await;

    // First case failed, second still ran and is reported alongside.
    assert_eq!(result.status, CheckStatus::Fail);
    assert!(result.detail.contains("non-JSON body"));
    assert!(result.detail.contains("3 showtimes"));
}

#[tokio::test]
async fn missing_remote_tool_fails_only_the_tool_check() {
    let server = MockServer::start().await;

    // Live webhook answers normally.
    Mock::given(method("GET"))
        .and(path("/api/showtimes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query_info": { "results_count": 2 }
        })))
        .mount(&server)
        .await;

    // The tool record is gone remotely.
    Mock::given(method("GET"))
        .and(path("/v1/convai/tools/tool_gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    // The agent record still binds the tool.
    Mock::given(method("GET"))
        .and(path("/v1/convai/agents/agent_ok"))
        .and(header("xi-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Miami Theater Voice Assistant",
            "conversation_config": {
                "agent": { "prompt": { "tools": ["tool_gone"] } }
            }
        })))
        .mount(&server)
        .await;

    let client = PlatformClient::new(&server.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let record = record_for(&server, "tool_gone", "agent_ok");
    let results = validator.run_all(&record).await;

    assert_eq!(results.len(), 3);
    let by_name = |name: &str| results.iter().find(|r| r.check_name == name).unwrap();
    assert_eq!(by_name(CHECK_TOOL_RECORD).status, CheckStatus::Fail);
    assert!(by_name(CHECK_TOOL_RECORD).detail.contains("tool not found"));
    assert_eq!(by_name(CHECK_LIVE_ENDPOINT).status, CheckStatus::Pass);
    assert_eq!(by_name(CHECK_AGENT_RECORD).status, CheckStatus::Pass);
}

#[tokio::test]
async fn tool_record_drift_is_reported_field_by_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/convai/tools/tool_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Something Else",
            "tool_config": {
                "api_schema": { "url": format!("{}/api/showtimes", server.uri()), "method": "POST" }
            }
        })))
        .mount(&server)
        .await;

    let client = PlatformClient::new(&server.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator.check_tool_record("tool_abc", &server.uri()).await;

    assert_eq!(result.status, CheckStatus::Fail);
    assert!(result.detail.contains("Something Else"));
    assert!(result.detail.contains("POST"));
}

#[tokio::test]
async fn matching_tool_record_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/convai/tools/tool_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Miami Theater Showtimes",
            "tool_config": {
                "api_schema": { "url": format!("{}/api/showtimes", server.uri()), "method": "GET" }
            }
        })))
        .mount(&server)
        .await;

    let client = PlatformClient::new(&server.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator.check_tool_record("tool_abc", &server.uri()).await;

    assert_eq!(result.status, CheckStatus::Pass);
}

#[tokio::test]
async fn agent_with_no_bound_tools_fails_the_agent_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/convai/agents/agent_bare"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Miami Theater Voice Assistant",
            "conversation_config": { "agent": { "prompt": { "tools": [] } } }
        })))
        .mount(&server)
        .await;

    let client = PlatformClient::new(&server.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator.check_agent_record("agent_bare", "tool_abc").await;

    assert_eq!(result.status, CheckStatus::Fail);
    assert!(result.detail.contains("no tools bound"));
}

#[tokio::test]
async fn agent_bound_to_a_different_tool_fails_with_the_bindings_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/convai/agents/agent_ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversation_config": { "agent": { "prompt": { "tools": ["tool_other"] } } }
        })))
        .mount(&server)
        .await;

    let client = PlatformClient::new(&server.uri(), "test-key").unwrap();
    let validator = Validator::new(&client).unwrap();
    let result = validator.check_agent_record("agent_ok", "tool_abc").await;

    assert_eq!(result.status, CheckStatus::Fail);
    assert!(result.detail.contains("tool_other"));
}
