//! Error types for the document model and the canvas controller.
//!
//! Precondition failures that indicate a bug in the caller (asking for the view
//! of an element that was never mirrored, a template that produced nothing) are
//! surfaced as `Err` values so the host decides how to present them. Nothing in
//! this crate panics on those paths.

use crate::element::ViewId;
use crate::model::{GraphId, ObjectType};

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("element not found: {0}")]
    NotFound(GraphId),
    #[error("duplicate element id: {0}")]
    DuplicateId(GraphId),
    #[error("element {id} is not a {expected:?}")]
    WrongType { id: GraphId, expected: ObjectType },
    #[error("state {0} has no parent data node")]
    MissingParent(GraphId),
    #[error("pathway already contains a {0:?} element")]
    Singleton(ObjectType),
}

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("no scene element for model element {0}")]
    NoView(GraphId),
    #[error("unknown scene element {0}")]
    UnknownView(ViewId),
    #[error("template `{0}` produced no elements")]
    EmptyTemplate(String),
    #[error("template `{0}` reported no drag target")]
    NoDragTarget(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Failure reported by a drawing backend.
#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error("draw backend failed: {0}")]
    Backend(String),
}
