//! Error types for the session crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `SessionError`: Failures of session lifecycle operations
//! - `StorageError`: Durable credential storage failures
//! - `TransportError`: Outbound request failures

use std::fmt;

/// Errors from session lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The remote service rejected a login attempt.
    ///
    /// The message is the service's own rejection text, suitable for
    /// surfacing directly in a login form.
    LoginRejected { message: String },
    /// A login attempt could not reach the remote service.
    LoginUnreachable { details: String },
    /// The sign-in response body could not be understood.
    InvalidLoginResponse { details: String },
    /// The persisted credential could not be written or erased.
    StorageFailed { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginRejected { message } => {
                write!(f, "login rejected: {message}")
            }
            Self::LoginUnreachable { details } => {
                write!(f, "login request failed: {details}")
            }
            Self::InvalidLoginResponse { details } => {
                write!(f, "invalid sign-in response: {details}")
            }
            Self::StorageFailed { details } => {
                write!(f, "credential storage failed: {details}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from durable credential storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading the persisted credential failed.
    Read { details: String },
    /// Writing the credential failed.
    Write { details: String },
    /// Erasing the persisted credential failed.
    Erase { details: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { details } => {
                write!(f, "failed to read persisted credential: {details}")
            }
            Self::Write { details } => {
                write!(f, "failed to persist credential: {details}")
            }
            Self::Erase { details } => {
                write!(f, "failed to erase persisted credential: {details}")
            }
        }
    }
}

impl std::error::Error for StorageError {}

/// Errors from the outbound request transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    ClientBuild { details: String },
    /// The request could not be sent or no response was received.
    Request { details: String },
    /// The response body could not be read.
    Body { details: String },
    /// The response body could not be decoded into the expected shape.
    Decode { details: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { details } => {
                write!(f, "failed to build HTTP client: {details}")
            }
            Self::Request { details } => {
                write!(f, "request failed: {details}")
            }
            Self::Body { details } => {
                write!(f, "failed to read response body: {details}")
            }
            Self::Decode { details } => {
                write!(f, "failed to decode response body: {details}")
            }
        }
    }
}

impl std::error::Error for TransportError {}
