//! Remote store error types.

use thiserror::Error;

/// Errors raised by a [`ContentStore`](super::ContentStore) or its companions.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A branch or ref does not exist.
    #[error("Reference not found: {reference}")]
    RefNotFound { reference: String },

    /// Any other failed remote call.
    #[error("Remote store error during {operation}: {message}")]
    Remote {
        operation: String,
        status: Option<u16>,
        message: String,
    },
}

impl StoreError {
    /// Creates a [`StoreError::Remote`].
    pub fn remote(operation: impl Into<String>, status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Creates a [`StoreError::RefNotFound`].
    pub fn ref_not_found(reference: impl Into<String>) -> Self {
        Self::RefNotFound {
            reference: reference.into(),
        }
    }

    /// Returns the HTTP status of a remote failure, if known.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RefNotFound { .. } => Some(404),
            Self::Remote { status, .. } => *status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_operation_and_message() {
        let error = StoreError::remote("create tree", Some(422), "tree.sha is invalid");
        assert_eq!(
            error.to_string(),
            "Remote store error during create tree: tree.sha is invalid"
        );
        assert_eq!(error.status(), Some(422));
    }

    #[test]
    fn ref_not_found_reports_404() {
        let error = StoreError::ref_not_found("heads/main");
        assert_eq!(error.status(), Some(404));
        assert!(error.to_string().contains("heads/main"));
    }
}
