//! Compact binary snapshots of game state.
//!
//! States are plain serde values, so any of them can be frozen to bytes and
//! thawed back. JSON (`to_serializable`) is the interchange format; snapshots
//! are for callers that store or ship many states.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::error::Result;

/// Encode a state to bytes.
pub fn encode<T: Serialize>(state: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(state)?)
}

/// Decode a state previously produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}
