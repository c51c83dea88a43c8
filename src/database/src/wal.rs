// Copyright © moonhollow 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use data::core::primitives::GameId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One committed mutation in a game's durable, strictly-ordered journal.
///
/// The WAL is the authoritative "what happened" trail: a record is written in
/// the same store transaction as the game snapshot it produced, so `seq`
/// matches the snapshot's `wal_seq` after every commit. A record whose `seq`
/// exceeds the persisted snapshot's is an orphan from a torn commit and is
/// discarded during recovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalRecord {
    pub game_id: GameId,
    pub seq: u64,
    /// Stable verb name of the mutation (intent verb or scheduler step).
    pub verb: String,
    pub args: serde_json::Value,
    pub pre_hash: String,
    pub post_hash: String,
    pub at_unix_ms: u64,
}

/// Content hash of a serialized game image, stored in WAL records so an
/// auditor can verify the journal chains correctly.
pub fn image_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_hash_is_stable() {
        let a = image_hash(b"village");
        let b = image_hash(b"village");
        assert_eq!(a, b);
        assert_ne!(a, image_hash(b"wolves"));
        assert_eq!(a.len(), 64);
    }
}
