//! Serializable data contracts shared by the guessing-game crates.
//!
//! Everything here is plain data: catalog records, durable challenge rules,
//! comparison results, the resumable chain-session snapshot and the payloads
//! sent to the score/achievement collaborators.

mod challenge;
mod comparison;
mod entity;
mod reporting;
mod snapshot;

pub use challenge::{ChallengeKind, ChallengeRule};
pub use comparison::{AttributeMatch, ComparisonResult, GenreOverlap, TagOverlap};
pub use entity::{Entity, EntityId};
pub use reporting::{AchievementUnlock, GameMode, ScoreSubmission};
pub use snapshot::{
    decode_session_json, encode_session_json, hash_session_snapshot, ChainSessionSnapshot,
    SnapshotDecodeError, SnapshotEncodeError, SNAPSHOT_VERSION,
};
