//! Post-provisioning consistency checks.
//!
//! Three independent checks run against a persisted record: the live
//! showtimes endpoint, the platform's stored tool record, and the
//! platform's stored agent record.  The checks are diagnostic, not gating —
//! every one of them runs regardless of the others' outcome, and the caller
//! gets a per-check result rather than an early abort.

use crate::error::SetupError;
use crate::platform::PlatformClient;
use crate::record::ProvisionRecord;
use crate::schema::{DayType, SHOWTIMES_PATH, TOOL_NAME, TimePreference};
use std::time::Duration;
use tracing::debug;

pub const CHECK_LIVE_ENDPOINT: &str = "live endpoint";
pub const CHECK_TOOL_RECORD: &str = "tool record";
pub const CHECK_AGENT_RECORD: &str = "agent record";

/// Representative query shapes exercised against the live endpoint.
pub const LIVE_QUERY_SHAPES: &[&[(&str, &str)]] = &[
    &[("day_type", DayType::Today.as_str())],
    &[("day_type", DayType::Tomorrow.as_str())],
    &[("day_type", DayType::Weekend.as_str())],
    &[("movie_title", "substance")],
    &[
        ("time_preference", TimePreference::Evening.as_str()),
        ("day_type", DayType::Today.as_str()),
    ],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
}

/// Outcome of a single check. Produced, reported, and discarded within a
/// validation run; never persisted.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub check_name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl ValidationResult {
    fn pass(check_name: &'static str, detail: String) -> Self {
        Self { check_name, status: CheckStatus::Pass, detail }
    }

    fn fail(check_name: &'static str, detail: String) -> Self {
        Self { check_name, status: CheckStatus::Fail, detail }
    }

    fn error(check_name: &'static str, detail: String) -> Self {
        Self { check_name, status: CheckStatus::Error, detail }
    }
}

pub struct Validator<'a> {
    client: &'a PlatformClient,
    http: reqwest::Client,
}

impl<'a> Validator<'a> {
    /// `client` is used for the two remote-record checks; the live-endpoint
    /// check gets its own unauthenticated client with the same bounded
    /// timeout.
    pub fn new(client: &'a PlatformClient) -> Result<Self, SetupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client, http })
    }

    /// Run all three checks. Order of execution carries no meaning; the
    /// checks share no state and each one's failure leaves the others
    /// untouched.
    pub async fn run_all(&self, record: &ProvisionRecord) -> Vec<ValidationResult> {
        vec![
            self.check_live_endpoint(&record.vercel_url).await,
            self.check_tool_record(&record.tool_id, &record.vercel_url).await,
            self.check_agent_record(&record.agent_id, &record.tool_id).await,
        ]
    }

    /// Probe the live endpoint with the standard query shapes.
    pub async fn check_live_endpoint(&self, base_url: &str) -> ValidationResult {
        self.check_live_endpoint_with(base_url, LIVE_QUERY_SHAPES).await
    }

    /// Probe the live endpoint with caller-chosen query shapes.
    ///
    /// Each shape is one GET carrying exactly those parameters.  A non-2xx
    /// status or a non-JSON body marks the case failed with the body kept
    /// as detail; the remaining cases still run.
    pub async fn check_live_endpoint_with(
        &self,
        base_url: &str,
        shapes: &[&[(&str, &str)]],
    ) -> ValidationResult {
        let url = format!("{}{}", base_url.trim_end_matches('/'), SHOWTIMES_PATH);
        let mut lines = Vec::new();
        let mut failed = 0usize;
        let mut errored = 0usize;

        for shape in shapes {
            let label = describe_shape(shape);
            debug!(%url, query = %label, "probing live endpoint");
            match self.http.get(&url).query(shape).send().await {
                Err(e) => {
                    errored += 1;
                    lines.push(format!("{label}: transport error: {e}"));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let body = resp.text().await.unwrap_or_default();
                    if !status.is_success() {
                        failed += 1;
                        lines.push(format!("{label}: HTTP {status}: {}", truncate(&body, 200)));
                        continue;
                    }
                    match parse_live_reply(&body) {
                        Some(reply) => {
                            let mut line =
                                format!("{label}: {} showtimes", reply.results_count);
                            if let Some(summary) = reply.summary {
                                line.push_str(&format!(" — {}", truncate(&summary, 100)));
                            }
                            lines.push(line);
                        }
                        None => {
                            failed += 1;
                            lines.push(format!(
                                "{label}: non-JSON body: {}",
                                truncate(&body, 200)
                            ));
                        }
                    }
                }
            }
        }

        let detail = lines.join("\n");
        if errored > 0 {
            ValidationResult::error(CHECK_LIVE_ENDPOINT, detail)
        } else if failed > 0 {
            ValidationResult::fail(CHECK_LIVE_ENDPOINT, detail)
        } else {
            ValidationResult::pass(CHECK_LIVE_ENDPOINT, detail)
        }
    }

    /// Fetch the stored tool record and compare it with what was provisioned.
    pub async fn check_tool_record(&self, tool_id: &str, webhook_base_url: &str) -> ValidationResult {
        let expected_url = format!("{}{}", webhook_base_url.trim_end_matches('/'), SHOWTIMES_PATH);
        match self.client.fetch_tool(tool_id).await {
            Err(e) => remote_failure(CHECK_TOOL_RECORD, "tool", e),
            Ok(tool) => {
                let mut mismatches = Vec::new();
                if tool.name != TOOL_NAME {
                    mismatches.push(format!("name is {:?}, expected {TOOL_NAME:?}", tool.name));
                }
                if tool.tool_config.api_schema.url != expected_url {
                    mismatches.push(format!(
                        "url is {:?}, expected {expected_url:?}",
                        tool.tool_config.api_schema.url
                    ));
                }
                if !tool.tool_config.api_schema.method.eq_ignore_ascii_case("GET") {
                    mismatches.push(format!(
                        "method is {:?}, expected \"GET\"",
                        tool.tool_config.api_schema.method
                    ));
                }
                if mismatches.is_empty() {
                    ValidationResult::pass(
                        CHECK_TOOL_RECORD,
                        format!("{} → GET {expected_url}", tool.name),
                    )
                } else {
                    ValidationResult::fail(CHECK_TOOL_RECORD, mismatches.join("; "))
                }
            }
        }
    }

    /// Fetch the stored agent record and verify its tool bindings.
    pub async fn check_agent_record(&self, agent_id: &str, expected_tool_id: &str) -> ValidationResult {
        match self.client.fetch_agent(agent_id).await {
            Err(e) => remote_failure(CHECK_AGENT_RECORD, "agent", e),
            Ok(agent) => {
                let bound = agent.bound_tool_ids();
                if bound.is_empty() {
                    ValidationResult::fail(CHECK_AGENT_RECORD, "no tools bound to agent".into())
                } else if bound.iter().any(|id| id == expected_tool_id) {
                    ValidationResult::pass(
                        CHECK_AGENT_RECORD,
                        format!("{} tool(s) bound, including {expected_tool_id}", bound.len()),
                    )
                } else {
                    ValidationResult::fail(
                        CHECK_AGENT_RECORD,
                        format!("bound tools {bound:?} do not include {expected_tool_id}"),
                    )
                }
            }
        }
    }
}

/// Map a fetch error onto the check-failure taxonomy: 404 is the record
/// being gone, other rejections and malformed payloads are failures with
/// the evidence attached, transport problems are errors.
fn remote_failure(check_name: &'static str, kind: &str, err: SetupError) -> ValidationResult {
    match err {
        SetupError::RemoteRejection { status: 404, .. } => {
            ValidationResult::fail(check_name, format!("{kind} not found"))
        }
        SetupError::RemoteRejection { status, body } => {
            ValidationResult::fail(check_name, format!("HTTP {status}: {}", truncate(&body, 200)))
        }
        SetupError::MalformedResponse { message, .. } => {
            ValidationResult::fail(check_name, format!("malformed {kind} record: {message}"))
        }
        other => ValidationResult::error(check_name, other.to_string()),
    }
}

struct LiveReply {
    results_count: u64,
    summary: Option<String>,
}

/// Parse a showtimes reply. `None` means the body was not JSON; a JSON body
/// without a count still parses, with the count defaulting to zero.
fn parse_live_reply(body: &str) -> Option<LiveReply> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let results_count = value
        .get("query_info")
        .and_then(|qi| qi.get("results_count"))
        .and_then(|c| c.as_u64())
        .unwrap_or(0);
    let summary = value
        .get("conversational_summary")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    Some(LiveReply { results_count, summary })
}

fn describe_shape(shape: &[(&str, &str)]) -> String {
    shape
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_reply_captures_count_and_summary() {
        let body = r#"{"query_info":{"results_count":5},"conversational_summary":"Found 5 movies..."}"#;
        let reply = parse_live_reply(body).unwrap();
        assert_eq!(reply.results_count, 5);
        assert_eq!(reply.summary.as_deref(), Some("Found 5 movies..."));
    }

    #[test]
    fn live_reply_defaults_missing_count_to_zero() {
        let reply = parse_live_reply(r#"{"showtimes":[]}"#).unwrap();
        assert_eq!(reply.results_count, 0);
        assert!(reply.summary.is_none());
    }

    #[test]
    fn non_json_body_is_not_a_reply() {
        assert!(parse_live_reply("<html>502 Bad Gateway</html>").is_none());
    }

    #[test]
    fn shape_description_joins_pairs() {
        assert_eq!(
            describe_shape(&[("time_preference", "evening"), ("day_type", "today")]),
            "time_preference=evening&day_type=today"
        );
        assert_eq!(describe_shape(&[("day_type", "weekend")]), "day_type=weekend");
    }

    #[test]
    fn truncate_keeps_short_strings_intact() {
        assert_eq!(truncate("short", 100), "short");
        let long = "x".repeat(150);
        let cut = truncate(&long, 100);
        assert_eq!(cut.chars().count(), 103);
        assert!(cut.ends_with("..."));
    }
}
