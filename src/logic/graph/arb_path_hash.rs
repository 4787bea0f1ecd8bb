use alloy_primitives::B256;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Route identifier, sha256 over the token sequence followed by the pool sequence.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArbPathHash(pub B256);

impl ArbPathHash {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0.0
    }
}

impl Display for ArbPathHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<[u8; 32]> for ArbPathHash {
    fn from(hash: [u8; 32]) -> Self {
        ArbPathHash(B256::from(hash))
    }
}
