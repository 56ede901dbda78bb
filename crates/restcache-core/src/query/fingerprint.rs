//! Deterministic query fingerprinting over the canonical descriptor.
#![allow(clippy::cast_possible_truncation)]

use crate::query::{CountMode, QueryDescriptor};
use sha2::{Digest, Sha256};

///
/// QueryFingerprint
///
/// Stable SHA-256 identity of a canonical query.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }
}

impl std::fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}

impl QueryDescriptor {
    /// Compute a stable fingerprint for this descriptor.
    #[must_use]
    pub fn fingerprint(&self) -> QueryFingerprint {
        let mut hasher = Sha256::new();
        hasher.update(b"queryfp:v1");

        write_tag(&mut hasher, 0x01);
        write_str(&mut hasher, &self.table);

        write_tag(&mut hasher, 0x02);
        write_tag(&mut hasher, count_tag(self.count));

        write_tag(&mut hasher, 0x03);
        write_tag(&mut hasher, u8::from(self.is_head));

        write_tag(&mut hasher, 0x04);
        write_str(&mut hasher, &self.query_key);

        write_tag(&mut hasher, 0x05);
        match &self.body_key {
            Some(body_key) => {
                write_tag(&mut hasher, 0x01);
                write_str(&mut hasher, body_key);
            }
            None => write_tag(&mut hasher, 0x00),
        }

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        QueryFingerprint(out)
    }
}

const fn count_tag(count: Option<CountMode>) -> u8 {
    match count {
        None => 0x00,
        Some(CountMode::Exact) => 0x01,
        Some(CountMode::Planned) => 0x02,
        Some(CountMode::Estimated) => 0x03,
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_u32(hasher, value.len() as u32);
    hasher.update(value.as_bytes());
}

fn write_u32(hasher: &mut Sha256, value: u32) {
    hasher.update(value.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
