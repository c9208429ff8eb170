//! infoCMDB client library
//!
//! Authenticated access to the infoCMDB web service: named webservice
//! queries, attribute update batches, a short-lived lookup cache, and a
//! harness for running workflows as single authenticated operations.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod workflow;

pub use client::{AttributeMutation, CmdbClient, UpdateMode};
pub use config::Config;
pub use error::{ApiError, ConfigError, Error, Result};
pub use workflow::{Diagnostics, Workflow, WorkflowError, WorkflowParams};
