use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ModelError;

/// Identifier wrapper as it travels on the wire: `{"id": "..."}`.
/// An empty string means "no identifier".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerId {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
}

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self { Self { id: id.into() } }

    pub fn as_str(&self) -> &str { &self.id }

    pub fn is_empty(&self) -> bool { self.id.is_empty() }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self { Self::new(id) }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self { Self::new(id) }
}

/// A directory record. `id` selects the storage key; the remaining fields are
/// profile data stored verbatim.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Player {
    pub id: Option<PlayerId>,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub level: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub attributes: BTreeMap<String, String>,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self { id: Some(id.into()), name: name.into(), ..Default::default() }
    }

    /// The storage identifier, if present and non-empty.
    pub fn key_id(&self) -> Option<&str> {
        self.id.as_ref().map(PlayerId::as_str).filter(|id| !id.is_empty())
    }
}

/// Rejects an identifier that is missing or empty.
pub fn validate_id(id: Option<&PlayerId>) -> Result<&PlayerId, ModelError> {
    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ModelError::Validation("ID is empty, please try again".into())),
    }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.is_empty() {
        return Err(ModelError::Validation("Name is empty, please try again".into()));
    }
    Ok(())
}

// Explicit JSON nulls decode to the field default instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
