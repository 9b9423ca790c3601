//! Node addressing and payload data model.
//!
//! [`NodeIdentity`] names a node, [`StoragePointer`] locates one write of its
//! data in an append-only log, and [`PointerList`] records every such write
//! in chronological order. The block and attribute types describe node
//! payloads as the write path builds them; their byte encoding lives
//! elsewhere.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// MIME-style tag attached to UTF-8 text payloads.
pub const META_PLAIN_TEXT_UTF8: &str = "text/plain;charset=utf-8";

/// Logical identity of a node within a named graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdentity {
    graph: String,
    node_id: String,
}

impl NodeIdentity {
    /// Creates an identity for `node_id` inside `graph`.
    pub fn new(graph: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            node_id: node_id.into(),
        }
    }

    /// Name of the graph the node belongs to.
    pub fn graph(&self) -> &str {
        &self.graph
    }

    /// Identifier of the node within its graph.
    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.graph, self.node_id)
    }
}

/// Byte range inside an append-only data segment.
///
/// The zero pointer (offset 0, length 0) means "no data" and is stored
/// like any other pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StoragePointer {
    /// Start of the range.
    pub offset: u64,
    /// Number of bytes in the range.
    pub length: u64,
}

impl StoragePointer {
    /// Creates a pointer to `length` bytes at `offset`.
    pub const fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// The "no data" sentinel.
    pub const fn null() -> Self {
        Self {
            offset: 0,
            length: 0,
        }
    }

    /// True for zero-length pointers.
    pub const fn is_null(&self) -> bool {
        self.length == 0
    }
}

/// Chronological list of storage pointers for one node.
pub type PointerList = Vec<StoragePointer>;

/// A node identity together with the pointer its payload was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeAddress {
    /// Which node.
    pub identity: NodeIdentity,
    /// Where its current payload lives, or [`StoragePointer::null`].
    pub pointer: StoragePointer,
}

/// Reference to a node, or nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AddressBlock {
    /// No address; used for anonymous or not-yet-assigned nodes.
    #[default]
    Empty,
    /// A node address.
    Node(NodeAddress),
}

impl AddressBlock {
    /// Builds a node address from its parts.
    pub fn node(
        graph: impl Into<String>,
        node_id: impl Into<String>,
        pointer: StoragePointer,
    ) -> Self {
        AddressBlock::Node(NodeAddress {
            identity: NodeIdentity::new(graph, node_id),
            pointer,
        })
    }

    /// The identity this block addresses, if any.
    pub fn identity(&self) -> Option<&NodeIdentity> {
        match self {
            AddressBlock::Empty => None,
            AddressBlock::Node(addr) => Some(&addr.identity),
        }
    }
}

/// Opaque bytes tagged with a content type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BinaryBlock {
    /// Content type of `bytes`, e.g. [`META_PLAIN_TEXT_UTF8`].
    pub meta: String,
    /// Raw payload.
    pub bytes: Vec<u8>,
}

impl BinaryBlock {
    /// Tags `bytes` with `meta`.
    pub fn new(meta: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            meta: meta.into(),
            bytes: bytes.into(),
        }
    }

    /// UTF-8 text payload.
    pub fn plain_text(text: impl Into<String>) -> Self {
        Self::new(META_PLAIN_TEXT_UTF8, text.into().into_bytes())
    }
}

/// A single attribute key or value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DataBlock {
    /// No data.
    #[default]
    Empty,
    /// A reference to another node.
    Address(AddressBlock),
    /// Tagged bytes.
    Binary(BinaryBlock),
}

impl DataBlock {
    /// Plain UTF-8 text.
    pub fn string(text: impl Into<String>) -> Self {
        DataBlock::Binary(BinaryBlock::plain_text(text))
    }

    /// Returns the text if this block holds a UTF-8 plain-text payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataBlock::Binary(b) if b.meta == META_PLAIN_TEXT_UTF8 => {
                std::str::from_utf8(&b.bytes).ok()
            }
            _ => None,
        }
    }
}

/// A data block stamped with the time it was written.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypedData {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    /// The payload.
    pub data: DataBlock,
}

impl TypedData {
    /// Stamps `data` with an explicit timestamp.
    pub fn at(timestamp: u64, data: DataBlock) -> Self {
        Self { timestamp, data }
    }

    /// Stamps `data` with the current wall-clock time.
    pub fn now(data: DataBlock) -> Self {
        Self::at(unix_nanos(), data)
    }
}

/// One node attribute.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyValue {
    /// Attribute name.
    pub key: TypedData,
    /// Attribute value.
    pub value: TypedData,
}

impl KeyValue {
    /// Text key and text value, both stamped now.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: TypedData::now(DataBlock::string(key)),
            value: TypedData::now(DataBlock::string(value)),
        }
    }
}

/// A node: its address plus attributes in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Where the node lives.
    pub id: AddressBlock,
    /// Attributes in insertion order.
    pub attributes: Vec<KeyValue>,
}

impl Node {
    /// Creates a node from an address and its attributes.
    pub fn new(id: AddressBlock, attributes: impl Into<Vec<KeyValue>>) -> Self {
        Self {
            id,
            attributes: attributes.into(),
        }
    }

    /// A node with no address and no attributes.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The node's identity, if it has an address.
    pub fn identity(&self) -> Option<&NodeIdentity> {
        self.id.identity()
    }
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos().min(u64::MAX as u128) as u64)
        .unwrap_or(0)
}
