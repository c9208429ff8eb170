//! Workflow harness
//!
//! Turns a process invocation into one authenticated, parameterized
//! operation:
//!
//! 1. **Initializing** - load the config and build the client
//! 2. **Authenticating** - log in
//! 3. **Executing** - decode the JSON parameters and run the operation
//!
//! A failure in any state fails the whole run. `Workflow::run` logs it and
//! exits with status 1.
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() {
//!     Workflow::new()
//!         .run(|params, cmdb| async move {
//!             cmdb.update_ci_attributes(params.ci_id, &[AttributeMutation::set("state", "done")])
//!                 .await?;
//!             Ok(())
//!         })
//!         .await;
//! }
//! ```

pub mod diagnostics;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::ffi::OsString;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::client::CmdbClient;
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::Error;
use crate::logging;

pub use diagnostics::Diagnostics;

/// Input parameters of a workflow, passed as JSON in the first argument
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowParams {
    pub apikey: String,

    #[serde(rename = "triggerType")]
    pub trigger_type: String,

    #[serde(deserialize_with = "lenient_id")]
    pub workflow_item_id: u64,

    #[serde(deserialize_with = "lenient_id")]
    pub workflow_instance_id: u64,

    #[serde(rename = "ciid", deserialize_with = "lenient_id")]
    pub ci_id: u64,

    #[serde(rename = "ciAttributeId", deserialize_with = "lenient_id")]
    pub ci_attribute_id: u64,

    #[serde(rename = "ciRelationId", deserialize_with = "lenient_id")]
    pub ci_relation_id: u64,

    #[serde(rename = "ciProjectId", deserialize_with = "lenient_id")]
    pub ci_project_id: u64,

    #[serde(rename = "fileImportHistoryId", deserialize_with = "lenient_id")]
    pub file_import_history_id: u64,
}

/// Accept `17`, `"17"`, `""` and `null`; the latter two mean 0
fn lenient_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0),
        Value::String(s) if s.trim().is_empty() => Ok(0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{}'", s))),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id {}", n))),
        other => Err(serde::de::Error::custom(format!("invalid id {}", other))),
    }
}

impl WorkflowParams {
    /// Decode the parameters from the program arguments (without argv[0]).
    ///
    /// Exactly one argument is expected. With `allow_empty` set, no
    /// argument at all is treated like `{}`.
    pub fn from_args(args: &[String], allow_empty: bool) -> Result<Self, WorkflowError> {
        match args {
            [] if allow_empty => {
                log::debug!("no workflow parameters given, using defaults");
                Ok(Self::default())
            }
            [] => Err(WorkflowError::MissingParams),
            [json] => serde_json::from_str(json).map_err(WorkflowError::InvalidParams),
            more => Err(WorkflowError::TooManyArguments(more.len())),
        }
    }
}

/// Program arguments as strings; `position` in the error is 1-based
fn decode_args(args: impl IntoIterator<Item = OsString>) -> Result<Vec<String>, WorkflowError> {
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            arg.into_string()
                .map_err(|_| WorkflowError::NonUtf8Argument(i + 1))
        })
        .collect()
}

/// Harness state a failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Initializing,
    Authenticating,
    Executing,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Initializing => "initializing",
            WorkflowState::Authenticating => "authenticating",
            WorkflowState::Executing => "executing",
        };
        f.write_str(name)
    }
}

/// Why a workflow run failed
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("failed to initialize workflow: {0}")]
    Initialization(#[source] Error),

    #[error("failed to login: {0}")]
    Authentication(#[source] Error),

    #[error("missing json encoded WorkflowParams as first program argument")]
    MissingParams,

    #[error("expected one program argument with json encoded WorkflowParams, got {0}")]
    TooManyArguments(usize),

    #[error("program argument {0} is not valid UTF-8")]
    NonUtf8Argument(usize),

    #[error("invalid workflow parameters: {0}")]
    InvalidParams(#[source] serde_json::Error),

    #[error("workflow failed: {0:#}")]
    Operation(anyhow::Error),

    #[error("workflow reported {} diagnostic(s): {}", .0.len(), .0.join("; "))]
    Diagnostics(Vec<String>),
}

impl WorkflowError {
    /// The harness state the failure belongs to
    pub fn state(&self) -> WorkflowState {
        match self {
            WorkflowError::Initialization(_) => WorkflowState::Initializing,
            WorkflowError::Authentication(_) => WorkflowState::Authenticating,
            WorkflowError::MissingParams
            | WorkflowError::TooManyArguments(_)
            | WorkflowError::NonUtf8Argument(_)
            | WorkflowError::InvalidParams(_)
            | WorkflowError::Operation(_)
            | WorkflowError::Diagnostics(_) => WorkflowState::Executing,
        }
    }
}

/// Everything needed to run (or test) a workflow
#[derive(Debug, Clone)]
pub struct Workflow {
    config: PathBuf,
    allow_empty_params: bool,
    diagnostics: Diagnostics,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Workflow {
    /// Workflow using `infocmdb.yml` and requiring the parameter argument
    pub fn new() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            allow_empty_params: false,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Change the configuration file used by the client
    pub fn set_config(&mut self, config: impl Into<PathBuf>) {
        self.config = config.into();
    }

    pub fn with_config(mut self, config: impl Into<PathBuf>) -> Self {
        self.set_config(config);
        self
    }

    /// Treat a missing parameter argument as `{}` (for ad-hoc runs)
    pub fn allow_empty_params(mut self, allow: bool) -> Self {
        self.allow_empty_params = allow;
        self
    }

    /// Handle to this run's diagnostics sink
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.clone()
    }

    /// Run the workflow for this process and exit with status 1 on failure.
    ///
    /// Installs the logger; any `log::error!` during execution fails the run.
    pub async fn run<F, Fut>(self, operation: F)
    where
        F: FnOnce(WorkflowParams, Arc<CmdbClient>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        if logging::init(logging::debug_from_env(), Some(self.diagnostics())).is_err() {
            log::warn!("logger already installed; log errors will not be tracked as diagnostics");
        }

        let result = match decode_args(std::env::args_os().skip(1)) {
            Ok(args) => self.execute(&args, operation).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            log::error!("{} (while {})", err, err.state());
            std::process::exit(1);
        }
    }

    /// Initialize from the config file, then authenticate and execute
    pub async fn execute<F, Fut>(&self, args: &[String], operation: F) -> Result<(), WorkflowError>
    where
        F: FnOnce(WorkflowParams, Arc<CmdbClient>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        log::debug!("workflow {}", WorkflowState::Initializing);
        let client = self.initialize().map_err(WorkflowError::Initialization)?;
        self.execute_with_client(client, args, operation).await
    }

    fn initialize(&self) -> crate::error::Result<Arc<CmdbClient>> {
        let config = Config::load(&self.config)?;
        let client = Arc::new(CmdbClient::new(config)?);
        client.cache().spawn_sweeper();
        Ok(client)
    }

    /// Authenticate and execute with an already built client
    pub async fn execute_with_client<F, Fut>(
        &self,
        client: Arc<CmdbClient>,
        args: &[String],
        operation: F,
    ) -> Result<(), WorkflowError>
    where
        F: FnOnce(WorkflowParams, Arc<CmdbClient>) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        log::debug!("workflow {}", WorkflowState::Authenticating);
        client.login().await.map_err(WorkflowError::Authentication)?;

        log::debug!("workflow {}", WorkflowState::Executing);
        let params = WorkflowParams::from_args(args, self.allow_empty_params)?;

        self.diagnostics.take();
        operation(params, client).await.map_err(WorkflowError::Operation)?;

        let reported = self.diagnostics.take();
        if !reported.is_empty() {
            return Err(WorkflowError::Diagnostics(reported));
        }

        log::info!("workflow finished");
        Ok(())
    }
}
