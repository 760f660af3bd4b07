//! Two-phase provisioning: tool, then agent, then the persisted record.
//!
//! The agent references the tool by id, so the phases are strictly ordered
//! and modelled as an explicit machine: `Idle → ToolRegistered →
//! AgentRegistered → Persisted`.  Any failure is terminal for the run and
//! names the phase it happened in; a partial record is never written.
//! There is no retry here — a failed run is re-invoked from `Idle`.

use crate::error::SetupError;
use crate::platform::PlatformClient;
use crate::record::ProvisionRecord;
use crate::{profile, schema};
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Phase of the provisioning machine a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    RegisterTool,
    RegisterAgent,
    Persist,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::RegisterTool => "tool registration",
            Phase::RegisterAgent => "agent registration",
            Phase::Persist => "record persistence",
        };
        f.write_str(name)
    }
}

/// A provisioning failure, tagged with the phase that produced it.
#[derive(Debug, Error)]
#[error("provisioning failed during {phase}: {source}")]
pub struct ProvisionError {
    pub phase: Phase,
    #[source]
    pub source: SetupError,
}

/// Intermediate states of a provisioning run.  The terminal state is the
/// saved [`ProvisionRecord`] returned by [`Provisioner::persist`].
///
/// Public so callers can drive the machine step-by-step; [`Provisioner::run`]
/// is the usual all-at-once entry point.
#[derive(Debug)]
pub enum ProvisionState {
    Idle,
    ToolRegistered { tool_id: String },
    AgentRegistered { tool_id: String, agent_id: String },
}

pub struct Provisioner<'a> {
    client: &'a PlatformClient,
}

impl<'a> Provisioner<'a> {
    pub fn new(client: &'a PlatformClient) -> Self {
        Self { client }
    }

    /// Register the webhook tool. First transition out of `Idle`.
    pub async fn register_tool(&self, webhook_base_url: &str) -> Result<ProvisionState, ProvisionError> {
        let tool_schema = schema::showtimes_tool(webhook_base_url);
        let tool_id = self
            .client
            .register_tool(&tool_schema)
            .await
            .map_err(|source| ProvisionError {
                phase: Phase::RegisterTool,
                source,
            })?;
        info!(%tool_id, "registered webhook tool");
        Ok(ProvisionState::ToolRegistered { tool_id })
    }

    /// Register the agent bound to an already-confirmed tool id.
    ///
    /// Taking `ToolRegistered` by value is what makes "agent before tool"
    /// unrepresentable: there is no agent step without a confirmed id.
    pub async fn register_agent(&self, state: ProvisionState) -> Result<ProvisionState, ProvisionError> {
        let ProvisionState::ToolRegistered { tool_id } = state else {
            return Err(ProvisionError {
                phase: Phase::RegisterAgent,
                source: SetupError::malformed(
                    "provision state",
                    "agent registration requires a registered tool",
                ),
            });
        };
        let agent_profile = profile::showtimes_agent(Some(&tool_id));
        let agent_id = self
            .client
            .register_agent(&agent_profile)
            .await
            .map_err(|source| ProvisionError {
                phase: Phase::RegisterAgent,
                source,
            })?;
        info!(%agent_id, "registered agent");
        Ok(ProvisionState::AgentRegistered { tool_id, agent_id })
    }

    /// Persist the completed record, overwriting any previous run's record.
    pub fn persist(
        &self,
        state: ProvisionState,
        webhook_base_url: &str,
        record_path: &Path,
    ) -> Result<ProvisionRecord, ProvisionError> {
        let ProvisionState::AgentRegistered { tool_id, agent_id } = state else {
            return Err(ProvisionError {
                phase: Phase::Persist,
                source: SetupError::malformed(
                    "provision state",
                    "persistence requires a registered agent",
                ),
            });
        };
        let record = ProvisionRecord::new(tool_id, agent_id, webhook_base_url.to_string());
        record.save(record_path).map_err(|source| ProvisionError {
            phase: Phase::Persist,
            source,
        })?;
        info!(path = %record_path.display(), "provision record saved");
        Ok(record)
    }

    /// Run the whole machine: tool, agent, record.
    pub async fn run(
        &self,
        webhook_base_url: &str,
        record_path: &Path,
    ) -> Result<ProvisionRecord, ProvisionError> {
        let state = self.register_tool(webhook_base_url).await?;
        let state = self.register_agent(state).await?;
        self.persist(state, webhook_base_url, record_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_names_are_operator_readable() {
        assert_eq!(Phase::RegisterTool.to_string(), "tool registration");
        assert_eq!(Phase::RegisterAgent.to_string(), "agent registration");
        assert_eq!(Phase::Persist.to_string(), "record persistence");
    }

    #[tokio::test]
    async fn agent_step_rejects_out_of_order_state() {
        let client = PlatformClient::new("http://127.0.0.1:1", "test-key").unwrap();
        let provisioner = Provisioner::new(&client);
        let err = provisioner
            .register_agent(ProvisionState::Idle)
            .await
            .unwrap_err();
        assert_eq!(err.phase, Phase::RegisterAgent);
    }

    #[test]
    fn persist_rejects_out_of_order_state() {
        let client = PlatformClient::new("http://127.0.0.1:1", "test-key").unwrap();
        let provisioner = Provisioner::new(&client);
        let dir = tempfile::tempdir().unwrap();
        let err = provisioner
            .persist(
                ProvisionState::Idle,
                "https://example.vercel.app",
                &dir.path().join("agent_config.json"),
            )
            .unwrap_err();
        assert_eq!(err.phase, Phase::Persist);
        // Nothing may be written on a failed persist.
        assert!(!dir.path().join("agent_config.json").exists());
    }
}
