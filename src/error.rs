//! Error types for the infoCMDB client

use thiserror::Error;

/// Result type alias for infoCMDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the library
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// The protocol-level classification, if this is an API error
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Protocol errors reported by the session, query and update layers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("arguments missing: {0}")]
    ArgumentsMissing(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("must provide credentials (username and password, or an api key)")]
    NoCredentials,

    #[error("login failed: server accepted the request but returned no token")]
    LoginFailed,

    #[error("webservice response was not ok: {0}")]
    ResponseNotOk(String),

    #[error("query returned no result: {0}")]
    NoResult(String),

    #[error("query returned too many results, expected one: {0}")]
    TooManyResults(String),

    #[error("not implemented: {0}")]
    NotImplemented(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to infoCMDB".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_not_ok_keeps_server_message() {
        let err = ApiError::ResponseNotOk("Invalid credentials".to_string());
        assert!(err.to_string().contains("not ok"));
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn test_no_credentials_message() {
        let err = ApiError::NoCredentials;
        assert!(err.to_string().contains("credentials"));
    }

    #[test]
    fn test_login_failed_distinct_from_not_ok() {
        let err = ApiError::LoginFailed;
        assert!(err.to_string().contains("no token"));
        assert!(!err.to_string().contains("not ok"));
    }

    #[test]
    fn test_single_row_errors() {
        let none = ApiError::NoResult("int_getAttributeIdByAttributeName".to_string());
        assert!(none.to_string().contains("no result"));

        let many = ApiError::TooManyResults("emp_lastname".to_string());
        assert!(many.to_string().contains("expected one"));
        assert!(many.to_string().contains("emp_lastname"));
    }

    #[test]
    fn test_config_error_parse() {
        let err = ConfigError::ParseError("unexpected key".to_string());
        assert!(err.to_string().contains("unexpected key"));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::NoCredentials.into();

        match err.api() {
            Some(ApiError::NoCredentials) => (),
            _ => panic!("Expected Error::Api(ApiError::NoCredentials)"),
        }
    }

    #[test]
    fn test_error_from_config_error() {
        let err: Error = ConfigError::NotFound("infocmdb.yml".to_string()).into();

        match err {
            Error::Config(ConfigError::NotFound(path)) => assert_eq!(path, "infocmdb.yml"),
            _ => panic!("Expected Error::Config(ConfigError::NotFound)"),
        }
        assert!(Error::Other("x".to_string()).api().is_none());
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
