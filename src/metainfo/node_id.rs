//! [`NodeId`] is the identity of a storage node as seen by the satellite.
//!
//! It is only ever used as a map key by the audit sampler. The textual form is
//! lowercase hex, both for [`std::fmt::Display`] and for serde.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Size in bytes of a [`NodeId`]
pub const NODE_ID_SIZE: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodeId([u8; NODE_ID_SIZE]);

impl NodeId {
    pub fn new(bytes: [u8; NODE_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a [`NodeId`] from an arbitrary slice.
    ///
    /// # Errors
    /// Returns [`Error::InvalidEvent`] if the slice isn't exactly [`NODE_ID_SIZE`] bytes long
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let id: [u8; NODE_ID_SIZE] = bytes.try_into().map_err(|_| Error::InvalidEvent {
            reason: format!(
                "node id must be {} bytes long, got {}",
                NODE_ID_SIZE,
                bytes.len()
            ),
        })?;

        Ok(Self(id))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl FromStr for NodeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let decoded = hex::decode(s).map_err(|e| Error::InvalidEvent {
            reason: format!("Unable to hex::decode node id {} - {}", s, e),
        })?;
        Self::from_slice(&decoded)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let stringified = String::deserialize(d)?;
        stringified.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{NodeId, NODE_ID_SIZE};
    use quickcheck::Arbitrary;

    impl Arbitrary for NodeId {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let mut id = [0u8; NODE_ID_SIZE];
            for b in id.iter_mut() {
                *b = u8::arbitrary(g);
            }
            NodeId::new(id)
        }
    }

    #[quickcheck]
    fn display_parse_is_lossless(id: NodeId) {
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_wrong_length() {
        let err = "abcd".parse::<NodeId>().unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidEvent { .. }));
    }

    #[test]
    fn rejects_non_hex() {
        assert!("zz".repeat(NODE_ID_SIZE).parse::<NodeId>().is_err());
    }

    #[test]
    fn serde_uses_hex_string() {
        let id = NodeId::new([1u8; NODE_ID_SIZE]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(NODE_ID_SIZE)));
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
