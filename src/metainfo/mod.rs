//! Metadata types seen by observers of a metadata walk.
//!
//! The walker itself lives outside of this crate. It visits every object, remote segment
//! and inline segment of the metadata store exactly once per pass, in no particular order,
//! and hands each one to every registered [`Observer`]. Only the shapes an observer
//! needs are modeled here.
use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::{Error, Result},
    utils::serde_hex_bytes,
};

pub mod node_id;

pub use node_id::NodeId;

/// The set of callbacks a metadata walk invokes.
///
/// Several unrelated components (audit sampling, repair checking, metrics...) observe the same
/// pass, so every observer implements all three callbacks even if it only cares about one.
/// Returning an error tells the walker to abort the pass.
pub trait Observer {
    fn object(&mut self, object: &Object) -> Result<()>;
    fn remote_segment(&mut self, segment: &Segment) -> Result<()>;
    fn inline_segment(&mut self, segment: &Segment) -> Result<()>;
}

/// An opaque, already encoded segment location.
///
/// Consumers must not try to interpret it - it's only meaningful to the metadata layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SegmentKey(Bytes);

impl SegmentKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Bytes> for SegmentKey {
    fn from(v: Bytes) -> Self {
        Self(v)
    }
}

impl From<&'static str> for SegmentKey {
    fn from(v: &'static str) -> Self {
        Self(Bytes::from_static(v.as_bytes()))
    }
}

impl From<String> for SegmentKey {
    fn from(v: String) -> Self {
        Self(Bytes::from(v))
    }
}

impl fmt::Debug for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SegmentKey({})", String::from_utf8_lossy(&self.0))
    }
}

// Keys that aren't valid utf8 fail to serialize rather than being lossily converted
impl Serialize for SegmentKey {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let stringified = std::str::from_utf8(&self.0).map_err(|e| {
            serde::ser::Error::custom(format!(
                "Unable to convert segment key into utf8 string - {}",
                e
            ))
        })?;
        s.serialize_str(stringified)
    }
}

impl<'de> Deserialize<'de> for SegmentKey {
    fn deserialize<D: Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        Ok(Self(Bytes::from(String::deserialize(d)?)))
    }
}

/// Position of a segment inside its object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPosition {
    Index(u32),
    /// The last segment of an object is addressed separately from the numbered ones
    Last,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObjectLocation {
    #[serde(with = "serde_hex_bytes")]
    pub project_id: Bytes,
    pub bucket_name: String,
    pub object_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SegmentLocation {
    #[serde(with = "serde_hex_bytes")]
    pub project_id: Bytes,
    pub bucket_name: String,
    pub object_key: String,
    pub position: SegmentPosition,
}

impl SegmentLocation {
    /// Encodes the location into the [`SegmentKey`] format used by the metadata layer:
    /// `<hex project id>/<s<index>|l>/<bucket>/<object key>`
    pub fn encode(&self) -> SegmentKey {
        let position = match self.position {
            SegmentPosition::Index(index) => format!("s{}", index),
            SegmentPosition::Last => "l".to_string(),
        };
        let project = hex::encode(&self.project_id);

        let mut buf = BytesMut::with_capacity(
            project.len() + position.len() + self.bucket_name.len() + self.object_key.len() + 3,
        );
        buf.put_slice(project.as_bytes());
        buf.put_u8(b'/');
        buf.put_slice(position.as_bytes());
        buf.put_u8(b'/');
        buf.put_slice(self.bucket_name.as_bytes());
        buf.put_u8(b'/');
        buf.put_slice(self.object_key.as_bytes());

        SegmentKey(buf.freeze())
    }
}

/// One redundancy piece of a segment, stored by exactly one storage node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Piece {
    pub number: u16,
    pub storage_node: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Segment {
    pub location: SegmentLocation,
    #[serde(default)]
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub encrypted_size: u64,
    /// Only set for inline segments, which live inside the metadata itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Object {
    pub location: ObjectLocation,
    pub segment_count: u32,
}

/// A single walker callback, as a value.
///
/// Lets a recorded (or synthetic) pass be replayed onto any [`Observer`] without
/// reimplementing the walker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalkEvent {
    Object(Object),
    RemoteSegment(Segment),
    InlineSegment(Segment),
}

impl WalkEvent {
    /// Invokes the callback of `observer` that matches this event
    pub fn dispatch(&self, observer: &mut dyn Observer) -> Result<()> {
        match self {
            WalkEvent::Object(object) => observer.object(object),
            WalkEvent::RemoteSegment(segment) => observer.remote_segment(segment),
            WalkEvent::InlineSegment(segment) => observer.inline_segment(segment),
        }
    }

    /// Parses one line of a newline-delimited JSON pass. Blank lines yield `None`.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::InvalidEvent`] if the line isn't a valid [`WalkEvent`]
    pub fn from_json_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let event = serde_json::from_str(line).map_err(|e| Error::InvalidEvent {
            reason: e.to_string(),
        })?;
        Ok(Some(event))
    }
}
