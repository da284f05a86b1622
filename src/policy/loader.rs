use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::field::check_token;
use crate::domain::{FieldError, ResponsePolicy};

/// Errors that can occur during policy loading.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<FieldError> for PolicyError {
    fn from(e: FieldError) -> Self {
        PolicyError::Validation(e.to_string())
    }
}

/// Load a response policy from a YAML file.
pub fn load_policy(path: impl AsRef<Path>) -> Result<ResponsePolicy, PolicyError> {
    let content = fs::read_to_string(path)?;
    let policy: ResponsePolicy = serde_yaml::from_str(&content)?;

    validate_policy(&policy)?;

    Ok(policy)
}

/// Load extra ignore-list entries from a text file.
///
/// Expected format: one address per line, # for comments. Order is kept.
pub fn load_ignore_list(path: impl AsRef<Path>) -> Result<Vec<String>, PolicyError> {
    let content = fs::read_to_string(path)?;
    let mut entries = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        check_token("Ignore entry", line, false)?;

        entries.push(line.to_string());
    }

    Ok(entries)
}

/// Validate policy configuration.
fn validate_policy(policy: &ResponsePolicy) -> Result<(), PolicyError> {
    if policy.version.is_empty() {
        return Err(PolicyError::Validation(
            "Policy version cannot be empty".to_string(),
        ));
    }

    for entry in &policy.ignore {
        check_token("Ignore entry", entry, false)?;
    }

    let mut seen_names = HashSet::new();
    for response in &policy.responses {
        check_token("Response name", &response.name, false)?;
        check_token("Agent id", &response.agent_id, true)?;

        if !seen_names.insert(&response.name) {
            return Err(PolicyError::Validation(format!(
                "Duplicate response name: {}",
                response.name
            )));
        }
    }

    Ok(())
}

/// Loads the response policy and an optional standalone ignore list.
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    policy_path: String,
    ignore_path: Option<String>,
}

impl PolicyLoader {
    /// Create a new policy loader.
    pub fn new(policy_path: impl Into<String>, ignore_path: Option<String>) -> Self {
        PolicyLoader {
            policy_path: policy_path.into(),
            ignore_path,
        }
    }

    /// Load the policy, appending entries from the ignore file if configured.
    pub fn load(&self) -> Result<ResponsePolicy, PolicyError> {
        let (policy, extra) = self.load_parts()?;
        Ok(merge_ignore(policy, &extra))
    }

    /// Load the policy file and the ignore file separately.
    pub fn load_parts(&self) -> Result<(ResponsePolicy, Vec<String>), PolicyError> {
        let policy = load_policy(&self.policy_path)?;
        let extra = match self.ignore_path {
            Some(ref path) => load_ignore_list(path)?,
            None => Vec::new(),
        };
        Ok((policy, extra))
    }
}

/// Append ignore entries not already present, keeping order.
pub fn merge_ignore(mut policy: ResponsePolicy, extra: &[String]) -> ResponsePolicy {
    for entry in extra {
        if !policy.ignore.contains(entry) {
            policy.ignore.push(entry.clone());
        }
    }
    policy
}
