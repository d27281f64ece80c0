use ahash::RandomState;
use serde::{Deserialize, Serialize};
use std::hash::{BuildHasher, Hasher};
use thiserror::Error;

use crate::{ChallengeRule, Entity, EntityId};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Resumable chain-mode state. The challenge is stored as its rule only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSessionSnapshot {
    pub reference: Entity,
    pub challenge: ChallengeRule,
    pub used_ids: Vec<EntityId>,
    pub rounds_completed: u32,
    pub accumulated_score: u32,
    pub terminal: bool,
    pub created_at_ms: u64,
    pub saved_at_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    checksum: u64,
    snapshot: ChainSessionSnapshot,
}

#[derive(Debug, Error)]
pub enum SnapshotEncodeError {
    #[error("failed to hash snapshot: {0}")]
    Hash(#[from] bincode::Error),
    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    #[error("malformed snapshot payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported snapshot version {found}")]
    UnsupportedVersion { found: u32 },
    #[error("snapshot checksum mismatch (stored {stored:#x}, computed {computed:#x})")]
    ChecksumMismatch { stored: u64, computed: u64 },
    #[error("failed to hash snapshot: {0}")]
    Hash(#[from] bincode::Error),
}

/// Deterministic hash over the bincode encoding of a snapshot.
pub fn hash_session_snapshot(snapshot: &ChainSessionSnapshot) -> bincode::Result<u64> {
    let encoded = bincode::serialize(snapshot)?;
    let mut hasher = RandomState::with_seeds(0, 0, 0, 0).build_hasher();
    hasher.write(&encoded);
    Ok(hasher.finish())
}

pub fn encode_session_json(snapshot: &ChainSessionSnapshot) -> Result<String, SnapshotEncodeError> {
    let envelope = SnapshotEnvelope {
        version: SNAPSHOT_VERSION,
        checksum: hash_session_snapshot(snapshot)?,
        snapshot: snapshot.clone(),
    };
    Ok(serde_json::to_string(&envelope)?)
}

pub fn decode_session_json(data: &str) -> Result<ChainSessionSnapshot, SnapshotDecodeError> {
    let envelope: SnapshotEnvelope = serde_json::from_str(data)?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(SnapshotDecodeError::UnsupportedVersion {
            found: envelope.version,
        });
    }
    let computed = hash_session_snapshot(&envelope.snapshot)?;
    if computed != envelope.checksum {
        return Err(SnapshotDecodeError::ChecksumMismatch {
            stored: envelope.checksum,
            computed,
        });
    }
    Ok(envelope.snapshot)
}
