//! Read-only projections of the GraphQL schema.
//!
//! Records are fetched once per page load and treated as immutable snapshots.
//! Edits are buffered by the page instances and written back through a
//! mutation pipeline, never applied to these structs in place.

pub mod member;
pub mod position;
pub mod project;

/// GraphQL lists come back as `null` as often as `[]`.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    use serde::Deserialize;
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
