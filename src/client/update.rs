//! Attribute update batches
//!
//! A batch of [`AttributeMutation`]s is validated locally, sent to the CMDB
//! in one call per CI, and the envelope outcome is classified.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

use super::session::CmdbClient;
use super::transport::{Body, Method};
use crate::error::{ApiError, Result};

/// Server messages meaning a `set` matched several value rows
const AMBIGUOUS_MARKERS: &[&str] = &["multiple", "more than one", "ambiguous", "too many"];

/// Server messages meaning a `set` matched no value row
const NOT_FOUND_MARKERS: &[&str] = &["not found", "does not exist", "no value", "no attribute"];

/// How a mutation treats the CI's existing value rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Overwrite the single existing row for the attribute
    Set,
    /// Add a new row, regardless of existing ones
    Insert,
    /// Remove one row, addressed by its ci-attribute id
    Delete,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Set => "set",
            UpdateMode::Insert => "insert",
            UpdateMode::Delete => "delete",
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpdateMode {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "set" => Ok(UpdateMode::Set),
            "insert" => Ok(UpdateMode::Insert),
            "delete" => Ok(UpdateMode::Delete),
            other => Err(ApiError::InvalidArgument(format!("unknown update mode '{}'", other))),
        }
    }
}

/// One change to one attribute of a CI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMutation {
    pub mode: UpdateMode,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Id of the value row; required for [`UpdateMode::Delete`]
    #[serde(rename = "ciAttributeId", skip_serializing_if = "Option::is_none")]
    pub ci_attribute_id: Option<u64>,
}

impl AttributeMutation {
    /// Overwrite the one existing value of `name`
    pub fn set(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mode: UpdateMode::Set,
            name: name.into(),
            value: Some(value.into()),
            ci_attribute_id: None,
        }
    }

    /// Add a value row for `name`
    pub fn insert(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mode: UpdateMode::Insert,
            name: name.into(),
            value: Some(value.into()),
            ci_attribute_id: None,
        }
    }

    /// Remove the value row `ci_attribute_id`
    pub fn delete(name: impl Into<String>, ci_attribute_id: u64) -> Self {
        Self {
            mode: UpdateMode::Delete,
            name: name.into(),
            value: None,
            ci_attribute_id: Some(ci_attribute_id),
        }
    }

    /// Target a specific value row
    pub fn with_ci_attribute_id(mut self, ci_attribute_id: u64) -> Self {
        self.ci_attribute_id = Some(ci_attribute_id);
        self
    }

    /// Check the mutation is well-formed for its mode
    pub fn validate(&self) -> Result<()> {
        match self.mode {
            UpdateMode::Delete => {
                if self.ci_attribute_id.is_none() {
                    return Err(ApiError::NotImplemented(format!(
                        "delete of attribute '{}' by name; a ciAttributeId is required",
                        self.name
                    ))
                    .into());
                }
                if self.value.is_some() {
                    return Err(ApiError::InvalidArgument(format!(
                        "delete of attribute '{}' must not carry a value",
                        self.name
                    ))
                    .into());
                }
            }
            UpdateMode::Set | UpdateMode::Insert => {
                if self.name.is_empty() {
                    return Err(ApiError::ArgumentsMissing(format!("attribute name for {}", self.mode)).into());
                }
                if self.value.is_none() {
                    return Err(ApiError::ArgumentsMissing(format!(
                        "value for {} of attribute '{}'",
                        self.mode, self.name
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// Map a failed update envelope onto the error taxonomy.
///
/// Only an all-`set` batch is classified; in a mixed batch the message
/// cannot be attributed to the `set` mutations.
fn classify_failure(message: String, batch: &[AttributeMutation]) -> ApiError {
    if batch.iter().all(|m| m.mode == UpdateMode::Set) {
        let lower = message.to_lowercase();
        if AMBIGUOUS_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return ApiError::TooManyResults(message);
        }
        if NOT_FOUND_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return ApiError::NoResult(message);
        }
    }
    ApiError::ResponseNotOk(message)
}

impl CmdbClient {
    /// Apply an ordered batch of attribute mutations to one CI.
    ///
    /// The whole batch is validated before anything is sent. Partial
    /// application on the server side is not rolled back here. A failed
    /// batch made only of `set` mutations is reported as `NoResult` or
    /// `TooManyResults` when the server says the target row was missing or
    /// ambiguous; every other failure is `ResponseNotOk`.
    pub async fn update_ci_attributes(&self, ci_id: u64, batch: &[AttributeMutation]) -> Result<()> {
        if batch.is_empty() {
            return Err(ApiError::ArgumentsMissing("attribute mutations".to_string()).into());
        }
        for mutation in batch {
            mutation.validate()?;
        }

        let body = json!({ "ci": { "attributes": batch } });
        let envelope = self
            .call(Method::Put, format!("/apiV2/ci/{}", ci_id), Body::Json(body))
            .await?;

        if envelope.success {
            log::debug!("updated {} attribute(s) of CI {}", batch.len(), ci_id);
            Ok(())
        } else {
            Err(classify_failure(envelope.message, batch).into())
        }
    }
}
