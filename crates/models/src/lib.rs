//! Player domain types and their storage encoding.

pub mod errors;
pub mod player;
pub mod codec;

pub use player::{Player, PlayerId};
