//! Engine errors.

use thiserror::Error;

use crate::value::PathError;

/// Errors that abort a render pass or a document load.
#[derive(Debug, Error)]
pub enum FormError {
    /// The flow names a field the schema does not define.
    #[error("field `{name}` is referenced by the flow but not defined in the schema")]
    FieldNotDefined { name: String },

    /// A field name is not a valid path.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// A schema document entry is structurally wrong.
    #[error("field `{field}`: {reason}")]
    InvalidDefinition { field: String, reason: String },

    /// A schema or flow document is not valid JSON for its shape.
    #[error("invalid schema document: {0}")]
    Schema(#[from] serde_json::Error),
}

pub type FormResult<T> = Result<T, FormError>;
