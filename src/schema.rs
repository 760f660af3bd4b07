//! Webhook tool schema for the showtimes endpoint.
//!
//! The schema is the invocation contract handed to the platform: URL,
//! method, query-parameter JSON Schema, headers, and timeout.  Parameters
//! with a fixed vocabulary (`day_type`, `time_preference`) are real enums so
//! drift is caught at compile time instead of at the platform boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Path the webhook serves, appended to the deployment base URL.
pub const SHOWTIMES_PATH: &str = "/api/showtimes";

/// Display name the tool is registered under.
pub const TOOL_NAME: &str = "Miami Theater Showtimes";

const TOOL_DESCRIPTION: &str = "Get current movie showtimes for Miami theaters. \
    Can search by date, movie title, day type (today/tomorrow/weekend), or time \
    preference (afternoon/evening/night).";

/// Seconds the platform waits for the webhook before giving up.
pub const RESPONSE_TIMEOUT_SECS: u64 = 10;

// ── Query-parameter vocabulary ──────────────────────────────────────────────

/// Quick date filter accepted by the showtimes endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayType {
    Today,
    Tomorrow,
    Weekend,
}

impl DayType {
    pub const ALL: [DayType; 3] = [DayType::Today, DayType::Tomorrow, DayType::Weekend];

    pub const fn as_str(&self) -> &'static str {
        match self {
            DayType::Today => "today",
            DayType::Tomorrow => "tomorrow",
            DayType::Weekend => "weekend",
        }
    }
}

/// Time-of-day filter accepted by the showtimes endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimePreference {
    Afternoon,
    Evening,
    Night,
}

impl TimePreference {
    pub const ALL: [TimePreference; 3] = [
        TimePreference::Afternoon,
        TimePreference::Evening,
        TimePreference::Night,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            TimePreference::Afternoon => "afternoon",
            TimePreference::Evening => "evening",
            TimePreference::Night => "night",
        }
    }
}

// ── Schema types ────────────────────────────────────────────────────────────

/// JSON-Schema-like description of one query parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// JSON Schema type: "string", "integer", "boolean".
    #[serde(rename = "type")]
    pub param_type: String,
    /// JSON Schema format hint (e.g. "date").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Closed vocabulary, when the parameter only accepts fixed values.
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<Vec<String>>,
    pub description: String,
}

impl ParamSpec {
    fn string(description: &str) -> Self {
        Self {
            param_type: "string".into(),
            format: None,
            allowed_values: None,
            description: description.into(),
        }
    }

    fn date(description: &str) -> Self {
        Self {
            format: Some("date".into()),
            ..Self::string(description)
        }
    }

    fn enumerated(values: impl IntoIterator<Item = &'static str>, description: &str) -> Self {
        Self {
            allowed_values: Some(values.into_iter().map(|v| v.to_string()).collect()),
            ..Self::string(description)
        }
    }
}

/// Invocation contract for a webhook tool.
///
/// Pure data; it is rendered to the platform wire shape by
/// [`ToolSchema::registration_body`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub endpoint_url: String,
    pub http_method: String,
    /// Keyed by parameter name; a `BTreeMap` keeps wire output deterministic.
    pub query_parameters: BTreeMap<String, ParamSpec>,
    pub request_headers: BTreeMap<String, String>,
    pub response_timeout_secs: u64,
}

impl ToolSchema {
    /// Render the platform registration payload.
    ///
    /// The query-parameter schema is closed (`additionalProperties: false`):
    /// parameters outside the declared set must be rejected by the remote
    /// service, never silently accepted.
    pub fn registration_body(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .query_parameters
            .iter()
            .map(|(name, spec)| (name.clone(), json!(spec)))
            .collect();

        json!({
            "tool_config": {
                "type": "webhook",
                "name": self.name,
                "description": self.description,
                "response_timeout_secs": self.response_timeout_secs,
                "api_schema": {
                    "url": self.endpoint_url,
                    "method": self.http_method,
                    "query_params_schema": {
                        "type": "object",
                        "properties": properties,
                        "additionalProperties": false,
                    },
                    "request_headers": self.request_headers,
                },
            },
        })
    }
}

// ── Builder ─────────────────────────────────────────────────────────────────

/// Build the showtimes webhook tool schema for the given deployment base URL.
///
/// Pure construction; a malformed base URL is deliberately not validated
/// here — the platform rejects it on registration.
pub fn showtimes_tool(base_url: &str) -> ToolSchema {
    let mut query_parameters = BTreeMap::new();
    query_parameters.insert(
        "date".to_string(),
        ParamSpec::date("Specific date in YYYY-MM-DD format (e.g., '2024-01-15')"),
    );
    query_parameters.insert(
        "movie_title".to_string(),
        ParamSpec::string(
            "Movie title to search for (partial matching supported, e.g., 'spider' for 'Spider-Man')",
        ),
    );
    query_parameters.insert(
        "day_type".to_string(),
        ParamSpec::enumerated(
            DayType::ALL.map(|d| d.as_str()),
            "Quick date filters: 'today' for current day, 'tomorrow' for next day, 'weekend' for Friday-Sunday",
        ),
    );
    query_parameters.insert(
        "time_preference".to_string(),
        ParamSpec::enumerated(
            TimePreference::ALL.map(|t| t.as_str()),
            "Filter by time of day: 'afternoon' (12-5 PM), 'evening' (5-9 PM), 'night' (9 PM+)",
        ),
    );

    let mut request_headers = BTreeMap::new();
    request_headers.insert("Content-Type".to_string(), "application/json".to_string());
    request_headers.insert("User-Agent".to_string(), "Marquee-Agent/1.0".to_string());

    ToolSchema {
        name: TOOL_NAME.to_string(),
        description: TOOL_DESCRIPTION.to_string(),
        endpoint_url: format!("{}{}", base_url.trim_end_matches('/'), SHOWTIMES_PATH),
        http_method: "GET".to_string(),
        query_parameters,
        request_headers,
        response_timeout_secs: RESPONSE_TIMEOUT_SECS,
    }
}
