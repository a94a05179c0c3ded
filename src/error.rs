//! Error types for BMC RPC operations.

use axum::http::StatusCode;
use thiserror::Error;

/// Main error type for BMC RPC operations
#[derive(Error, Debug)]
pub enum BmcError {
    /// Port index could not be parsed as an integer
    #[error("error getting integer value from port '{0}': {1}")]
    InvalidPortIndex(String, std::num::ParseIntError),

    /// MAC address is not six hex octets
    #[error("invalid MAC address '{0}'")]
    InvalidMacAddress(String),

    /// RPC host is not present in the machines map
    #[error("unknown host '{0}'")]
    UnknownHost(String),

    /// RPC method is not one of the supported methods
    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    /// Params did not match the shape the method expects
    #[error("invalid params for method '{0}': {1}")]
    InvalidParams(String, String),

    /// Controller has no device with this MAC address
    #[error("device with MAC address {0} not found")]
    DeviceNotFound(String),

    /// Device has no port override with this index
    #[error("port {1} not found on device {0}")]
    PortNotFound(String, u32),

    /// Login to the controller failed
    #[error("controller login failed: {0}")]
    Login(String),

    /// Controller answered with an error status or `meta.rc != "ok"`
    #[error("controller API error: {0}")]
    Api(String),

    /// Transport-level failure talking to the controller
    #[error("controller request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Config file could not be read
    #[error("failed to read config file '{0}': {1}")]
    ConfigRead(String, std::io::Error),

    /// Config file is not valid YAML for this schema
    #[error("failed to parse config file '{0}': {1}")]
    ConfigParse(String, serde_yaml::Error),

    /// Config parsed but failed validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl BmcError {
    /// HTTP status a request handler answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            BmcError::InvalidPortIndex(..)
            | BmcError::InvalidMacAddress(_)
            | BmcError::InvalidParams(..) => StatusCode::BAD_REQUEST,
            BmcError::UnknownHost(_)
            | BmcError::UnknownMethod(_)
            | BmcError::DeviceNotFound(_)
            | BmcError::PortNotFound(..) => StatusCode::NOT_FOUND,
            BmcError::Login(_)
            | BmcError::Api(_)
            | BmcError::Http(_)
            | BmcError::ConfigRead(..)
            | BmcError::ConfigParse(..)
            | BmcError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias for BMC RPC operations
pub type Result<T> = std::result::Result<T, BmcError>;
