//! Service layer for the player directory.
//! - `storage`: key-value adapters (Redis, in-memory) behind one trait.
//! - `directory`: validation and create/update/delete rules over a store.
//! - `errors`: the error type every operation returns.

pub mod errors;
pub mod storage;
pub mod directory;
#[cfg(test)]
pub mod test_support;
