use thiserror::Error;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    ConstraintViolation,

    // Integration/IO
    Serialization,
    Persistence,

    /// A lifecycle hook failed and the host transaction was rolled back
    TransactionAborted,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::TransactionAborted => "ERR_TRANSACTION_ABORTED",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus context
/// (operation, entity, message, cause) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (`Type#id` for tracked instances)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Walk the source chain and return the innermost error
    pub fn root_cause(&self) -> &ExError {
        let mut current = self;
        while let Some(next) = current.source_error() {
            current = next;
        }
        current
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Specific failures raised while building, encoding or validating revisions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RevisionError {
    /// Instance id variant disagrees with the configured instance id type
    #[error("instance id {instance_id} is not of the configured type {expected}")]
    InstanceIdTypeMismatch {
        instance_id: String,
        expected: String,
    },

    /// Revision id variant disagrees with the configured primary key strategy
    #[error("revision id {revision_id} does not match the {expected} primary key strategy")]
    RevisionIdTypeMismatch {
        revision_id: String,
        expected: String,
    },

    /// Token primary keys must be generated by the caller before insert
    #[error("token primary key strategy requires a revision id before insert")]
    MissingRevisionToken,

    /// Instance type tag was empty
    #[error("instance type tag must not be empty")]
    EmptyInstanceType,

    /// Table name is not a plain SQL identifier
    #[error("invalid revision table name: {name}")]
    InvalidTableName { name: String },

    /// A value could not be turned into a snapshot body
    #[error("cannot encode snapshot body: {reason}")]
    Encode { reason: String },

    /// Stored body text is not well-formed JSON
    #[error("cannot decode snapshot body: {reason}")]
    Decode { reason: String },

    /// Entity snapshot is not a JSON object
    #[error("snapshot of {instance_type} is not an object")]
    BodyNotObject { instance_type: String },

    /// Configuration document could not be parsed
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Stored row carries a column type this store cannot read
    #[error("unexpected column value in {column}: {reason}")]
    CorruptRow { column: String, reason: String },
}

impl From<RevisionError> for ExError {
    fn from(err: RevisionError) -> Self {
        let message = err.to_string();
        match err {
            RevisionError::InstanceIdTypeMismatch { instance_id, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(instance_id)
                    .with_message(message)
            }
            RevisionError::RevisionIdTypeMismatch { revision_id, .. } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(revision_id)
                    .with_message(message)
            }
            RevisionError::MissingRevisionToken => {
                ExError::new(ExErrorKind::ConstraintViolation).with_message(message)
            }
            RevisionError::EmptyInstanceType | RevisionError::InvalidTableName { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            RevisionError::InvalidConfig { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            RevisionError::Encode { .. }
            | RevisionError::Decode { .. }
            | RevisionError::BodyNotObject { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            RevisionError::CorruptRow { .. } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExErrorKind::NotFound.code(), "ERR_NOT_FOUND");
        assert_eq!(
            ExErrorKind::TransactionAborted.code(),
            "ERR_TRANSACTION_ABORTED"
        );
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::ConstraintViolation)
            .with_op("revision_insert")
            .with_entity_id("Post#1")
            .with_message("rejected");
        let text = err.to_string();
        assert!(text.contains("ERR_CONSTRAINT_VIOLATION"));
        assert!(text.contains("revision_insert"));
        assert!(text.contains("Post#1"));
    }

    #[test]
    fn test_root_cause_walks_chain() {
        let inner = ExError::new(ExErrorKind::Serialization).with_message("bad body");
        let outer = ExError::new(ExErrorKind::TransactionAborted).with_source(inner);
        assert_eq!(outer.root_cause().kind(), ExErrorKind::Serialization);
        assert!(std::error::Error::source(&outer).is_some());
    }

    #[test]
    fn test_revision_error_mapping() {
        let err: ExError = RevisionError::MissingRevisionToken.into();
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);

        let err: ExError = RevisionError::Decode {
            reason: "eof".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
