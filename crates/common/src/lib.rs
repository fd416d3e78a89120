//! Shared building blocks for the directory workspace: logging setup and
//! wire types that do not belong to the player domain.

pub mod types;
pub mod utils;
