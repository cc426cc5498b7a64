//! Binary codec for the inter-node protocol.
//!
//! Layout rules:
//! - every envelope starts with a one-byte protocol version;
//! - integers are big-endian `u32`, strings are a `u32` byte length followed
//!   by UTF-8 bytes;
//! - a name set is a count followed by that many strings, in whatever order
//!   the sender iterated them. Decoding deduplicates and sorts;
//! - a map is a count followed by key/value pairs. A repeated key replaces
//!   the earlier entry.
//!
//! Decoders build into locals and only hand out fully decoded values, so a
//! failed decode never leaks a partially populated snapshot.

use std::collections::{BTreeMap, BTreeSet};

use analyzers_inventory_sdk::{
    AggregatedResponse, ComponentInventory, FailureKind, NodeFailure, NodeInfo, PluginComponents,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const WIRE_VERSION: u8 = 1;

const REPLY_TAG_INFO: u8 = 0;
const REPLY_TAG_FAILURE: u8 = 1;

/// Smallest encoding of a string: its length prefix.
const MIN_STRING_LEN: usize = 4;

/// Malformed or unsupported payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("truncated payload: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("unsupported wire version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown {what} tag {tag}")]
    UnknownTag { what: &'static str, tag: u8 },

    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),

    #[error("length {0} does not fit in a u32 prefix")]
    LengthOverflow(usize),

    #[error("unexpected action '{0}'")]
    UnexpectedAction(String),

    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("node '{0}' appears more than once in the response")]
    DuplicateNode(String),
}

/// Request envelope sent to every targeted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodesRequest {
    pub action: String,
    pub node_ids: BTreeSet<String>,
}

impl NodesRequest {
    #[must_use]
    pub fn new<I, S>(action: impl Into<String>, node_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action: action.into(),
            node_ids: node_ids.into_iter().map(Into::into).collect(),
        }
    }
}

/// What a single node answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeReply {
    Info(NodeInfo),
    Failure(String),
}

struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    fn new() -> Self {
        let mut buf = BytesMut::with_capacity(256);
        buf.put_u8(WIRE_VERSION);
        Self { buf }
    }

    fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    fn put_len(&mut self, len: usize) -> Result<(), WireError> {
        let len = u32::try_from(len).map_err(|_| WireError::LengthOverflow(len))?;
        self.buf.put_u32(len);
        Ok(())
    }

    fn put_str(&mut self, value: &str) -> Result<(), WireError> {
        self.put_len(value.len())?;
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    fn put_names<'a, I>(&mut self, names: I) -> Result<(), WireError>
    where
        I: ExactSizeIterator<Item = &'a String>,
    {
        self.put_len(names.len())?;
        for name in names {
            self.put_str(name)?;
        }
        Ok(())
    }

    fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    fn new(payload: &'a [u8]) -> Result<Self, WireError> {
        let mut reader = Self { buf: payload };
        let version = reader.get_u8()?;
        if version != WIRE_VERSION {
            return Err(WireError::UnsupportedVersion(version));
        }
        Ok(reader)
    }

    fn ensure(&self, needed: usize) -> Result<(), WireError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(WireError::Truncated { needed, remaining });
        }
        Ok(())
    }

    fn get_u8(&mut self) -> Result<u8, WireError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    fn get_len(&mut self) -> Result<usize, WireError> {
        self.ensure(4)?;
        let len = self.buf.get_u32();
        usize::try_from(len).map_err(|_| WireError::LengthOverflow(usize::MAX))
    }

    /// Reads an element count and rejects counts the remaining payload
    /// cannot possibly hold.
    fn get_count(&mut self, min_item_len: usize) -> Result<usize, WireError> {
        let count = self.get_len()?;
        let needed = count.saturating_mul(min_item_len);
        self.ensure(needed)?;
        Ok(count)
    }

    fn get_string(&mut self) -> Result<String, WireError> {
        let len = self.get_len()?;
        self.ensure(len)?;
        let (head, tail) = self.buf.split_at(len);
        let value = std::str::from_utf8(head).map_err(|_| WireError::InvalidUtf8)?;
        self.buf = tail;
        Ok(value.to_owned())
    }

    fn get_names(&mut self) -> Result<BTreeSet<String>, WireError> {
        let count = self.get_count(MIN_STRING_LEN)?;
        let mut names = BTreeSet::new();
        for _ in 0..count {
            names.insert(self.get_string()?);
        }
        Ok(names)
    }

    fn finish(self) -> Result<(), WireError> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(WireError::TrailingBytes(n)),
        }
    }
}

// --- name sets ---------------------------------------------------------------

/// Encodes a set of component names in the caller's iteration order.
///
/// # Errors
/// Returns `WireError::LengthOverflow` if a name or the set is too large.
pub fn encode_names<I, S>(names: I) -> Result<Bytes, WireError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let mut w = WireWriter::new();
    w.put_names(names.iter())?;
    Ok(w.finish())
}

/// # Errors
/// Returns `WireError` if the payload is malformed.
pub fn decode_names(payload: &[u8]) -> Result<BTreeSet<String>, WireError> {
    let mut r = WireReader::new(payload)?;
    let names = r.get_names()?;
    r.finish()?;
    Ok(names)
}

// --- node info -----------------------------------------------------------------

fn put_plugin(w: &mut WireWriter, plugin: &PluginComponents) -> Result<(), WireError> {
    w.put_names(plugin.analyzers().iter())?;
    w.put_names(plugin.tokenizers().iter())?;
    w.put_names(plugin.token_filters().iter())?;
    w.put_names(plugin.char_filters().iter())?;
    w.put_names(plugin.hunspell_dictionaries().iter())
}

fn get_plugin(r: &mut WireReader<'_>, name: String) -> Result<PluginComponents, WireError> {
    Ok(PluginComponents::new(name)
        .with_analyzers(r.get_names()?)
        .with_tokenizers(r.get_names()?)
        .with_token_filters(r.get_names()?)
        .with_char_filters(r.get_names()?)
        .with_hunspell_dictionaries(r.get_names()?))
}

fn put_node_info(w: &mut WireWriter, info: &NodeInfo) -> Result<(), WireError> {
    let inventory = info.inventory();
    w.put_str(info.node_id())?;
    w.put_names(inventory.analyzers().iter())?;
    w.put_names(inventory.tokenizers().iter())?;
    w.put_names(inventory.token_filters().iter())?;
    w.put_names(inventory.char_filters().iter())?;
    w.put_names(inventory.normalizers().iter())?;

    w.put_len(info.plugins().len())?;
    for (key, plugin) in info.plugins() {
        w.put_str(key)?;
        put_plugin(w, plugin)?;
    }
    Ok(())
}

fn get_node_info(r: &mut WireReader<'_>) -> Result<NodeInfo, WireError> {
    let node_id = r.get_string()?;
    let inventory = ComponentInventory::new()
        .with_analyzers(r.get_names()?)
        .with_tokenizers(r.get_names()?)
        .with_token_filters(r.get_names()?)
        .with_char_filters(r.get_names()?)
        .with_normalizers(r.get_names()?);

    // key + five empty sets
    let count = r.get_count(MIN_STRING_LEN * 6)?;
    let mut plugins = BTreeMap::new();
    for _ in 0..count {
        let key = r.get_string()?;
        let plugin = get_plugin(r, key.clone())?;
        plugins.insert(key, plugin);
    }

    Ok(NodeInfo::new(node_id, inventory, plugins.into_values()))
}

/// # Errors
/// Returns `WireError::LengthOverflow` if a field is too large to encode.
pub fn encode_node_info(info: &NodeInfo) -> Result<Bytes, WireError> {
    let mut w = WireWriter::new();
    put_node_info(&mut w, info)?;
    Ok(w.finish())
}

/// # Errors
/// Returns `WireError` if the payload is malformed.
pub fn decode_node_info(payload: &[u8]) -> Result<NodeInfo, WireError> {
    let mut r = WireReader::new(payload)?;
    let info = get_node_info(&mut r)?;
    r.finish()?;
    Ok(info)
}

// --- envelopes -----------------------------------------------------------------

/// # Errors
/// Returns `WireError::LengthOverflow` if a field is too large to encode.
pub fn encode_nodes_request(request: &NodesRequest) -> Result<Bytes, WireError> {
    let mut w = WireWriter::new();
    w.put_str(&request.action)?;
    w.put_names(request.node_ids.iter())?;
    Ok(w.finish())
}

/// # Errors
/// Returns `WireError` if the payload is malformed.
pub fn decode_nodes_request(payload: &[u8]) -> Result<NodesRequest, WireError> {
    let mut r = WireReader::new(payload)?;
    let action = r.get_string()?;
    let node_ids = r.get_names()?;
    r.finish()?;
    Ok(NodesRequest { action, node_ids })
}

/// # Errors
/// Returns `WireError::LengthOverflow` if a field is too large to encode.
pub fn encode_node_reply(reply: &NodeReply) -> Result<Bytes, WireError> {
    let mut w = WireWriter::new();
    match reply {
        NodeReply::Info(info) => {
            w.put_u8(REPLY_TAG_INFO);
            put_node_info(&mut w, info)?;
        }
        NodeReply::Failure(reason) => {
            w.put_u8(REPLY_TAG_FAILURE);
            w.put_str(reason)?;
        }
    }
    Ok(w.finish())
}

/// # Errors
/// Returns `WireError` if the payload is malformed.
pub fn decode_node_reply(payload: &[u8]) -> Result<NodeReply, WireError> {
    let mut r = WireReader::new(payload)?;
    let reply = match r.get_u8()? {
        REPLY_TAG_INFO => NodeReply::Info(get_node_info(&mut r)?),
        REPLY_TAG_FAILURE => NodeReply::Failure(r.get_string()?),
        tag => return Err(WireError::UnknownTag { what: "reply", tag }),
    };
    r.finish()?;
    Ok(reply)
}

fn failure_kind_tag(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::Unreachable => 0,
        FailureKind::Timeout => 1,
        FailureKind::CollectionFailure => 2,
        FailureKind::Serialization => 3,
    }
}

fn failure_kind_from_tag(tag: u8) -> Result<FailureKind, WireError> {
    match tag {
        0 => Ok(FailureKind::Unreachable),
        1 => Ok(FailureKind::Timeout),
        2 => Ok(FailureKind::CollectionFailure),
        3 => Ok(FailureKind::Serialization),
        tag => Err(WireError::UnknownTag {
            what: "failure kind",
            tag,
        }),
    }
}

/// Encodes a merged response for forwarding to the client-facing node.
///
/// # Errors
/// Returns `WireError::LengthOverflow` if a field is too large to encode.
pub fn encode_aggregated_response(response: &AggregatedResponse) -> Result<Bytes, WireError> {
    let mut w = WireWriter::new();
    w.put_str(response.cluster_name())?;

    w.put_len(response.nodes().len())?;
    for info in response.nodes() {
        put_node_info(&mut w, info)?;
    }

    w.put_len(response.failures().len())?;
    for failure in response.failures() {
        w.put_str(failure.node_id())?;
        w.put_u8(failure_kind_tag(failure.kind()));
        w.put_str(failure.reason())?;
    }
    Ok(w.finish())
}

/// # Errors
/// Returns `WireError` if the payload is malformed, or
/// `WireError::DuplicateNode` if a node id is listed more than once across
/// successes and failures.
pub fn decode_aggregated_response(payload: &[u8]) -> Result<AggregatedResponse, WireError> {
    let mut r = WireReader::new(payload)?;
    let cluster_name = r.get_string()?;
    let mut seen = BTreeSet::new();

    // node id + five empty sets + empty plugin map
    let node_count = r.get_count(MIN_STRING_LEN * 7)?;
    let mut nodes = Vec::new();
    for _ in 0..node_count {
        let info = get_node_info(&mut r)?;
        if !seen.insert(info.node_id().to_owned()) {
            return Err(WireError::DuplicateNode(info.node_id().to_owned()));
        }
        nodes.push(info);
    }

    // node id + tag + reason
    let failure_count = r.get_count(MIN_STRING_LEN * 2 + 1)?;
    let mut failures = Vec::new();
    for _ in 0..failure_count {
        let node_id = r.get_string()?;
        let kind = failure_kind_from_tag(r.get_u8()?)?;
        let reason = r.get_string()?;
        if !seen.insert(node_id.clone()) {
            return Err(WireError::DuplicateNode(node_id));
        }
        failures.push(NodeFailure::new(node_id, kind, reason));
    }

    r.finish()?;
    Ok(AggregatedResponse::new(cluster_name, nodes, failures))
}
