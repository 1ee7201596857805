use crate::model::ServiceId;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One problem found while validating a definition or invocation arguments.
///
/// `parameter` is the position in the ordered schema (parameters carry no
/// names); `constraint` is the wire key when a specific constraint is at
/// fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub parameter: Option<usize>,
    pub constraint: Option<String>,
    pub message: String,
}

impl ConstraintViolation {
    pub fn definition(message: impl Into<String>) -> Self {
        Self {
            parameter: None,
            constraint: None,
            message: message.into(),
        }
    }

    pub fn parameter(index: usize, message: impl Into<String>) -> Self {
        Self {
            parameter: Some(index),
            constraint: None,
            message: message.into(),
        }
    }

    pub fn constraint(index: usize, key: &str, message: impl Into<String>) -> Self {
        Self {
            parameter: Some(index),
            constraint: Some(key.to_string()),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.parameter, self.constraint.as_deref()) {
            (Some(index), Some(key)) => {
                write!(f, "parameter {} ({}): {}", index, key, self.message)
            }
            (Some(index), None) => write!(f, "parameter {}: {}", index, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

/// Coarse classification for the transport layer. The observed HTTP envelope
/// maps these to 400 / 404 / 409 / 503-class statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Unavailable,
}

/// Every way a coordinator operation can fail.
///
/// All of these are deterministic outcomes of the current state: nothing is
/// transient, nothing is retried internally, and each names the offending
/// field or id.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// Malformed definition or invocation arguments. Carries every violation
    /// found in one pass.
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<ConstraintViolation>),

    /// Create/alter referenced dependency ids that do not exist.
    #[error("unknown dependencies: {}", .0.join(", "))]
    UnknownDependency(Vec<ServiceId>),

    #[error("service '{0}' not found")]
    NotFound(ServiceId),

    /// The service exists but no instance matches `(ip, port)`.
    #[error("no instance registered at {ip}:{port} for service '{service_id}'")]
    EndpointNotRegistered {
        service_id: ServiceId,
        ip: String,
        port: u16,
    },

    /// The service exists but no subscription matches the token.
    #[error("no subscription with token '{token}' for service '{service_id}'")]
    UnknownSubscription { service_id: ServiceId, token: String },

    /// Deletion blocked: other definitions still declare this service.
    #[error("service '{service_id}' is still a dependency of: {}", .dependents.join(", "))]
    DependedUpon {
        service_id: ServiceId,
        dependents: Vec<ServiceId>,
    },

    /// Selection against an empty instance registry.
    #[error("service '{0}' has no registered instances")]
    NoAvailableInstance(ServiceId),
}

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::Validation(_) | CoordinatorError::UnknownDependency(_) => {
                ErrorKind::Validation
            }
            CoordinatorError::NotFound(_) => ErrorKind::NotFound,
            CoordinatorError::EndpointNotRegistered { .. }
            | CoordinatorError::UnknownSubscription { .. }
            | CoordinatorError::DependedUpon { .. } => ErrorKind::Conflict,
            CoordinatorError::NoAvailableInstance(_) => ErrorKind::Unavailable,
        }
    }
}

fn join_violations(violations: &[ConstraintViolation]) -> String {
    violations
        .iter()
        .map(|violation| violation.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A specialized Result type for coordinator operations.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
