//! Authenticated session against the infoCMDB API

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::envelope::Envelope;
use super::transport::{Body, HttpTransport, Method, Transport, TransportRequest, TransportResponse};
use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Token endpoint
pub const AUTH_TOKEN_PATH: &str = "/apiV2/auth/token";

/// Prefix of the named webservice endpoint
pub const QUERY_PATH: &str = "/apiV2/query/execute";

/// Token lifetime requested at login, in seconds
pub const TOKEN_LIFETIME_SECS: u32 = 600;

/// Authentication state of a session.
///
/// The only transition is `Unauthenticated -> Authenticated`, made by
/// [`CmdbClient::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated { token: String },
}

/// Session client for one infoCMDB instance.
///
/// Holds the immutable [`Config`], the transport, the auth state and the
/// lookup cache. Created once per process and shared behind an `Arc`.
pub struct CmdbClient {
    config: Config,
    transport: Arc<dyn Transport>,
    auth_state: RwLock<AuthState>,
    /// Serializes login attempts; `auth_state` is only locked for the transition
    login_lock: Mutex<()>,
    cache: Arc<ResultCache>,
}

impl CmdbClient {
    /// Create a client talking HTTP to `config.url`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.url)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over any transport.
    ///
    /// A pre-issued `api_key` in the config makes the session start out
    /// authenticated.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        let auth_state = match config.api_key.as_deref() {
            Some(token) if !token.is_empty() => AuthState::Authenticated {
                token: token.to_string(),
            },
            _ => AuthState::Unauthenticated,
        };

        Self {
            config,
            transport,
            auth_state: RwLock::new(auth_state),
            login_lock: Mutex::new(()),
            cache: Arc::new(ResultCache::new()),
        }
    }

    /// Replace the lookup cache (e.g. to share one between clients)
    pub fn with_cache(mut self, cache: Arc<ResultCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.auth_state.read().await, AuthState::Authenticated { .. })
    }

    /// Log in with username and password.
    ///
    /// A no-op when the session is already authenticated. Concurrent
    /// logins are serialized; other calls made while a login is in flight
    /// see an unauthenticated session and fail with `NoCredentials`.
    pub async fn login(&self) -> Result<()> {
        #[derive(Deserialize, Default)]
        struct LoginData {
            #[serde(default)]
            token: String,
        }

        let _login = self.login_lock.lock().await;
        if self.is_authenticated().await {
            log::debug!("already logged in");
            return Ok(());
        }

        if self.config.username.is_empty() || self.config.password.is_empty() {
            return Err(ApiError::NoCredentials.into());
        }

        let form = vec![
            ("username".to_string(), self.config.username.clone()),
            ("password".to_string(), self.config.password.clone()),
            ("lifetime".to_string(), TOKEN_LIFETIME_SECS.to_string()),
        ];
        let response = self
            .transport
            .send(TransportRequest {
                method: Method::Post,
                path: AUTH_TOKEN_PATH.to_string(),
                body: Body::Form(form),
                bearer: None,
            })
            .await?;

        let data = Envelope::decode(&response)?.into_data()?;
        let login: LoginData = match data {
            Value::Null => LoginData::default(),
            data => serde_json::from_value(data).map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse login response: {}", e))
            })?,
        };

        if login.token.is_empty() {
            return Err(ApiError::LoginFailed.into());
        }

        log::debug!("logged in as {}", self.config.username);
        *self.auth_state.write().await = AuthState::Authenticated { token: login.token };
        Ok(())
    }

    /// Current token, or `NoCredentials` when not logged in
    async fn token(&self) -> Result<String> {
        match &*self.auth_state.read().await {
            AuthState::Authenticated { token } => Ok(token.clone()),
            AuthState::Unauthenticated => Err(ApiError::NoCredentials.into()),
        }
    }

    /// Send a request with the session's bearer token attached
    pub(crate) async fn send_authenticated(
        &self,
        method: Method,
        path: String,
        body: Body,
    ) -> Result<TransportResponse> {
        let token = self.token().await?;
        self.transport
            .send(TransportRequest {
                method,
                path,
                body,
                bearer: Some(token),
            })
            .await
    }

    /// Send an authenticated request and decode the envelope
    pub(crate) async fn call(&self, method: Method, path: String, body: Body) -> Result<Envelope> {
        let response = self.send_authenticated(method, path, body).await?;
        Envelope::decode(&response)
    }

    async fn execute_webservice(&self, name: &str, params: &[(&str, &str)]) -> Result<TransportResponse> {
        if name.is_empty() {
            return Err(ApiError::ArgumentsMissing("webservice name".to_string()).into());
        }

        let form = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        log::debug!("executing webservice {}", name);
        self.send_authenticated(Method::Post, format!("{}/{}", QUERY_PATH, name), Body::Form(form))
            .await
    }

    /// Execute a named webservice and return the decoded `data` payload.
    ///
    /// Requires a prior [`login`](Self::login); never logs in implicitly.
    pub async fn query(&self, name: &str, params: &[(&str, &str)]) -> Result<Value> {
        let response = self.execute_webservice(name, params).await?;
        Envelope::decode(&response)?.into_data()
    }

    /// Execute a named webservice and return the response body as sent
    pub async fn query_raw(&self, name: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self.execute_webservice(name, params).await?;
        let envelope = Envelope::decode(&response)?;
        if !envelope.success {
            return Err(ApiError::ResponseNotOk(envelope.message).into());
        }
        Ok(response.body)
    }

    /// Execute a named webservice and decode `data` into `T`
    pub async fn query_as<T: DeserializeOwned>(&self, name: &str, params: &[(&str, &str)]) -> Result<T> {
        let data = self.query(name, params).await?;
        serde_json::from_value(data).map_err(|e| {
            ApiError::InvalidResponse(format!("Unexpected result of {}: {}", name, e)).into()
        })
    }
}
