//! Storage encoding for [`Player`] records.
//!
//! Values are JSON text with camelCase keys. Encoding always writes every
//! field, including unset ones (`"id": null`, `"level": 0`, ...), so a stored
//! value is a complete snapshot and a write is a full overwrite. Decoding is
//! lenient: missing keys and explicit nulls take the field default, unknown
//! keys are skipped.

use crate::errors::ModelError;
use crate::player::Player;

pub fn encode(player: &Player) -> Result<String, ModelError> {
    serde_json::to_string(player).map_err(|e| ModelError::Encode(e.to_string()))
}

pub fn decode(raw: &str) -> Result<Player, ModelError> {
    serde_json::from_str(raw).map_err(|e| ModelError::Decode(e.to_string()))
}
