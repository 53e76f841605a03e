// SPDX-License-Identifier: MIT

//! The consistent-hash ring itself, kept separate from [`crate::router::Router`]
//! so it can be unit-tested against known CRC-32 values without spinning up
//! any connections.

use std::collections::BTreeMap;

use crc::{Crc, CRC_32_ISO_HDLC};

/// The unsigned IEEE/ISO-HDLC CRC-32 (polynomial `0xEDB88320` reflected) —
/// the same variant `zlib.crc32`/Python's `binascii.crc32` compute. This is
/// *not* CRC-32C/Castagnoli.
static CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

pub fn hash_bytes(data: &[u8]) -> u32 {
    CRC32.checksum(data)
}

/// A sorted ring mapping hash positions to node indices.
///
/// Built from `(name, replica_count)` pairs in caller-supplied order; when
/// two replica points hash to the same position, the later pair in the input
/// wins, matching a plain `dict`/`HashMap` insert loop.
#[derive(Debug, Clone)]
pub struct HashRing {
    // BTreeMap keeps entries sorted by hash and later `insert`s for an
    // existing key overwrite the value, giving the last-insertion-wins rule
    // for free.
    points: BTreeMap<u32, usize>,
}

impl HashRing {
    pub fn build<'a>(nodes: impl IntoIterator<Item = (&'a str, usize, u32)>) -> Self {
        let mut points = BTreeMap::new();
        for (name, node_idx, replicas) in nodes {
            for replica in 0..replicas {
                let hash = hash_bytes(format!("{name}: {replica}").as_bytes());
                points.insert(hash, node_idx);
            }
        }
        HashRing { points }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The node index owning `key`: the first ring position at or after
    /// `hash(key)`, wrapping around to the smallest position if `key` hashes
    /// past every point on the ring.
    pub fn locate(&self, key: &[u8]) -> Option<usize> {
        let hash = hash_bytes(key);
        self.points
            .range(hash..)
            .next()
            .or_else(|| self.points.iter().next())
            .map(|(_, &idx)| idx)
    }
}
