//! Deserialization helpers for update payloads.

use serde::{Deserialize, Deserializer};

/// Marks a field as supplied. Paired with `#[serde(default)]` so an absent key stays `None`.
///
/// For a nullable field `T` is `Option<_>`, so an explicit `null` becomes `Some(None)`.
/// For a required field an explicit `null` fails to decode.
pub fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
