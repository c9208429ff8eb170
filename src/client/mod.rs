//! infoCMDB API client
//!
//! [`CmdbClient`] owns the session; queries, attribute updates and the
//! webservice catalogue are implemented on it across the submodules.

pub mod envelope;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod session;
pub mod transport;
pub mod update;
pub mod webservice;

pub use envelope::Envelope;
pub use models::{AttributeValueType, CreatedCi, RelationDirection};
pub use session::{AuthState, CmdbClient, TOKEN_LIFETIME_SECS};
pub use transport::{Body, HttpTransport, Method, Transport, TransportRequest, TransportResponse};
pub use update::{AttributeMutation, UpdateMode};
