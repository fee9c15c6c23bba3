//! Form load states and modes.

use lampshop_core::ProductId;

/// Where a product form is in its load/submit lifecycle.
///
/// ```text
/// Create:  Ready ─select─▶ LoadingSchema ─resolve─▶ Ready
/// Edit:    Idle ─start─▶ LoadingEntity ─loaded─▶ SchemaStale ─resolve─▶ Ready
/// Submit:  Ready ─fail─▶ SubmitError
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormLoadState {
    /// Edit form not started, or entity load failed.
    Idle,
    /// Fetching the product being edited.
    LoadingEntity,
    /// Fetching the schema for a newly selected category.
    LoadingSchema,
    /// Usable.
    Ready,
    /// Edit mode: draft populated, persisted attributes held aside, schema
    /// for the product's category in flight.
    SchemaStale,
    /// The last submit failed; the draft is intact.
    SubmitError,
}

impl FormLoadState {
    /// Whether attribute edits and submit are allowed.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Ready | Self::SubmitError)
    }
}

impl std::fmt::Display for FormLoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::LoadingEntity => write!(f, "loading product"),
            Self::LoadingSchema => write!(f, "loading attributes"),
            Self::Ready => write!(f, "ready"),
            Self::SchemaStale => write!(f, "validating attributes"),
            Self::SubmitError => write!(f, "submit failed"),
        }
    }
}

/// Whether the form creates a new product or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ProductId),
}

impl FormMode {
    /// The product being edited, if any.
    #[must_use]
    pub const fn product_id(self) -> Option<ProductId> {
        match self {
            Self::Create => None,
            Self::Edit(id) => Some(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editable_states() {
        assert!(FormLoadState::Ready.is_editable());
        assert!(FormLoadState::SubmitError.is_editable());
        assert!(!FormLoadState::SchemaStale.is_editable());
        assert!(!FormLoadState::Idle.is_editable());
    }
}
