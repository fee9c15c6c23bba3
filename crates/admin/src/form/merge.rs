//! Reconciling attribute values with a resolved schema.

use lampshop_core::{AttributeDefinition, AttributeValues};

/// Fresh values for `definitions`: every key at its kind's default.
#[must_use]
pub fn seed_attributes(definitions: &[AttributeDefinition]) -> AttributeValues {
    definitions
        .iter()
        .map(|def| (def.key.clone(), def.default_value()))
        .collect()
}

/// Intersect persisted values with `definitions`.
///
/// Keys without a persisted value get the kind default. Persisted keys the
/// schema does not declare are dropped. A persisted value of the wrong kind
/// is coerced to the declared kind.
#[must_use]
pub fn merge_attributes(
    definitions: &[AttributeDefinition],
    mut persisted: AttributeValues,
) -> AttributeValues {
    definitions
        .iter()
        .map(|def| {
            let value = persisted
                .remove(&def.key)
                .map_or_else(|| def.default_value(), |v| v.coerce(def.kind));
            (def.key.clone(), value)
        })
        .collect()
}
