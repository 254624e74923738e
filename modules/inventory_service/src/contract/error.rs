//! Contract error types for inventory service
//!
//! These errors are transport-agnostic and used for inter-module communication.

/// Inventory service domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Request carries no identity
    Unauthorized,
    /// Identity present but role or tenant does not allow the action
    Forbidden {
        /// Why access was refused
        reason: String,
    },
    /// Malformed input or schema-violating data
    Validation {
        /// Field-level messages
        errors: Vec<String>,
    },
    /// Entity absent or not owned by the caller's tenant
    NotFound {
        /// Resource type (item, audit_entry, operation, schema)
        resource: String,
        /// Resource identifier
        id: String,
    },
    /// Double undo, duplicate role, duplicate id
    Conflict {
        /// Conflict reason
        reason: String,
    },
    /// Action cannot be applied in the current state
    InvalidOperation {
        /// Explanation
        reason: String,
    },
    /// Internal error
    Internal,
}

impl InventoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }

    pub fn not_found(resource: &str, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::Conflict {
            reason: reason.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for InventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden { reason } => write!(f, "Forbidden: {}", reason),
            Self::Validation { errors } => {
                write!(f, "Validation error: {}", errors.join(", "))
            }
            Self::NotFound { resource, id } => {
                write!(f, "{} not found: {}", resource, id)
            }
            Self::Conflict { reason } => write!(f, "Conflict: {}", reason),
            Self::InvalidOperation { reason } => write!(f, "Invalid operation: {}", reason),
            Self::Internal => write!(f, "Internal error"),
        }
    }
}

impl std::error::Error for InventoryError {}
