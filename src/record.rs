//! The provision record: the single durable artifact of a provisioning run.
//!
//! Written once at the end of a successful run and never mutated; a
//! re-provisioning run overwrites it wholesale.  The write is atomic from
//! the caller's perspective (temp file + rename), so a crash mid-write
//! leaves the previous record intact rather than a half-written one.

use crate::error::SetupError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default record path, relative to the working directory.
pub const DEFAULT_RECORD_PATH: &str = "agent_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionRecord {
    pub tool_id: String,
    pub agent_id: String,
    /// Base URL of the webhook deployment the tool points at.
    pub vercel_url: String,
    pub created_at: DateTime<Utc>,
}

impl ProvisionRecord {
    pub fn new(tool_id: String, agent_id: String, vercel_url: String) -> Self {
        Self {
            tool_id,
            agent_id,
            vercel_url,
            created_at: Utc::now(),
        }
    }

    /// Load a record, failing with [`SetupError::MissingLocalRecord`] when
    /// no provisioning run has been persisted at `path`.
    pub fn load(path: &Path) -> Result<Self, SetupError> {
        if !path.exists() {
            return Err(SetupError::MissingLocalRecord {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| SetupError::malformed("provision record", e.to_string()))
    }

    /// Persist the record, replacing any previous one.
    ///
    /// The record is written to a temporary sibling and renamed into place;
    /// rename is atomic on the filesystems we care about, so readers only
    /// ever see the old record or the complete new one.
    pub fn save(&self, path: &Path) -> Result<(), SetupError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| SetupError::malformed("provision record", e.to_string()))?;

        let mut tmp = path.as_os_str().to_os_string();
        tmp.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
