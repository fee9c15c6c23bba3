//! Product create/edit form synchronization.
//!
//! Three asynchronous effects feed one form: loading the edited product,
//! loading the schema of its category, and loading the schema of a category
//! the user picks. [`FormSyncEngine`] folds their results into one consistent
//! state; [`FormController`] runs the calls and feeds the results back.

mod backend;
mod controller;
mod engine;
mod merge;
mod state;

use lampshop_core::{AttributeKind, AttributeParseError};
use thiserror::Error;

use crate::api::ApiError;

pub use backend::CatalogBackend;
pub use controller::{FormController, FormUpdate};
pub use engine::{
    EntityResolution, FieldEdit, FormSyncEngine, SchemaRequest, SchemaResolution, SchemaToken,
    SubmitOutcome, SubmitRequest,
};
pub use merge::{merge_attributes, seed_attributes};
pub use state::{FormLoadState, FormMode};

/// Errors raised by form operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    /// A field failed local validation.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// The operation is not allowed in the current state.
    #[error("form is not ready ({0})")]
    NotReady(FormLoadState),

    /// A submit is already running.
    #[error("a save is already in progress")]
    SubmitInProgress,

    /// The selected category has no such attribute.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    /// The value kind does not match the attribute definition.
    #[error("attribute '{key}' expects a {expected} value")]
    AttributeKind { key: String, expected: AttributeKind },

    /// Raw input could not be parsed for the attribute's kind.
    #[error("invalid value for attribute '{key}': {source}")]
    InvalidAttribute {
        key: String,
        #[source]
        source: AttributeParseError,
    },

    /// The edited product could not be loaded.
    #[error("failed to load product: {0}")]
    EntityLoad(#[source] ApiError),
}
