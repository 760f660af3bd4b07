//! HTTP client for the conversational-AI platform.
//!
//! The platform owns the authoritative tool and agent state; this client
//! only submits registration payloads and fetches records back by id.
//! Every call is authenticated with the `xi-api-key` header.  Non-success
//! statuses are surfaced as [`SetupError::RemoteRejection`] with the body
//! retained verbatim for diagnosis.

use crate::error::SetupError;
use crate::profile::AgentProfile;
use crate::schema::ToolSchema;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Production platform API root.
pub const DEFAULT_PLATFORM_URL: &str = "https://api.elevenlabs.io";

const API_KEY_HEADER: &str = "xi-api-key";

pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlatformClient {
    /// Build a client against `base_url` (no trailing slash needed).
    ///
    /// The client-side timeout is bounded so a hung platform call cannot
    /// stall a provisioning or validation run indefinitely.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, SetupError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit a tool schema; returns the platform-assigned tool id.
    pub async fn register_tool(&self, schema: &ToolSchema) -> Result<String, SetupError> {
        let url = self.url("/v1/convai/tools");
        debug!(%url, tool = %schema.name, "registering webhook tool");
        let resp = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&schema.registration_body())
            .send()
            .await?;
        let body = expect_json(resp, "tool registration").await?;
        id_field(&body, "tool_id", "tool registration")
    }

    /// Submit an agent profile; returns the platform-assigned agent id.
    pub async fn register_agent(&self, profile: &AgentProfile) -> Result<String, SetupError> {
        let url = self.url("/v1/convai/agents/create");
        debug!(%url, agent = %profile.name, "registering agent");
        let resp = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&profile.registration_body())
            .send()
            .await?;
        let body = expect_json(resp, "agent registration").await?;
        id_field(&body, "agent_id", "agent registration")
    }

    /// Fetch the stored tool record by id.
    pub async fn fetch_tool(&self, tool_id: &str) -> Result<RemoteTool, SetupError> {
        let url = self.url(&format!("/v1/convai/tools/{tool_id}"));
        debug!(%url, "fetching tool record");
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body = expect_json(resp, "tool fetch").await?;
        serde_json::from_value(body)
            .map_err(|e| SetupError::malformed("tool fetch", e.to_string()))
    }

    /// Fetch the stored agent record by id.
    pub async fn fetch_agent(&self, agent_id: &str) -> Result<RemoteAgent, SetupError> {
        let url = self.url(&format!("/v1/convai/agents/{agent_id}"));
        debug!(%url, "fetching agent record");
        let resp = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;
        let body = expect_json(resp, "agent fetch").await?;
        serde_json::from_value(body)
            .map_err(|e| SetupError::malformed("agent fetch", e.to_string()))
    }
}

/// Reject non-2xx with the body captured, then parse the body as JSON.
async fn expect_json(resp: reqwest::Response, context: &str) -> Result<Value, SetupError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SetupError::RemoteRejection {
            status: status.as_u16(),
            body,
        });
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| SetupError::malformed(context, e.to_string()))
}

fn id_field(body: &Value, field: &str, context: &str) -> Result<String, SetupError> {
    body.get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| SetupError::malformed(context, format!("response missing {field}")))
}

// ── Remote record views ─────────────────────────────────────────────────────
//
// Deserialized views of the platform's stored records, reduced to the
// fields the validator compares.  Unknown fields are ignored; missing
// fields default so a sparse record still yields a comparable view.

#[derive(Debug, Default, Deserialize)]
pub struct RemoteTool {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tool_config: RemoteToolConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteToolConfig {
    #[serde(default)]
    pub api_schema: RemoteApiSchema,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteApiSchema {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteAgent {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conversation_config: RemoteConversationConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteConversationConfig {
    #[serde(default)]
    pub agent: RemoteAgentConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteAgentConfig {
    #[serde(default)]
    pub prompt: RemotePromptConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemotePromptConfig {
    /// Tool bindings as stored remotely; entries may be bare id strings or
    /// expanded objects depending on platform version.
    #[serde(default)]
    pub tools: Vec<Value>,
}

impl RemoteAgent {
    /// Extract the bound tool ids, tolerating both wire forms.
    pub fn bound_tool_ids(&self) -> Vec<String> {
        self.conversation_config
            .agent
            .prompt
            .tools
            .iter()
            .filter_map(|entry| {
                entry
                    .as_str()
                    .map(|s| s.to_string())
                    .or_else(|| {
                        entry
                            .get("id")
                            .or_else(|| entry.get("tool_id"))
                            .and_then(|v| v.as_str())
                            .map(|s| s.to_string())
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remote_tool_parses_platform_shape() {
        let body = json!({
            "name": "Miami Theater Showtimes",
            "description": "Get current movie showtimes",
            "tool_config": {
                "api_schema": {
                    "url": "https://example.vercel.app/api/showtimes",
                    "method": "GET"
                }
            },
            "unknown_field": 42
        });
        let tool: RemoteTool = serde_json::from_value(body).unwrap();
        assert_eq!(tool.name, "Miami Theater Showtimes");
        assert_eq!(tool.tool_config.api_schema.method, "GET");
    }

    #[test]
    fn bound_tool_ids_accepts_strings_and_objects() {
        let body = json!({
            "conversation_config": {
                "agent": {
                    "prompt": {
                        "tools": ["tool_abc", {"id": "tool_def"}, {"tool_id": "tool_ghi"}]
                    }
                }
            }
        });
        let agent: RemoteAgent = serde_json::from_value(body).unwrap();
        assert_eq!(agent.bound_tool_ids(), vec!["tool_abc", "tool_def", "tool_ghi"]);
    }

    #[test]
    fn sparse_agent_record_yields_empty_bindings() {
        let agent: RemoteAgent = serde_json::from_value(json!({})).unwrap();
        assert!(agent.bound_tool_ids().is_empty());
    }
}
