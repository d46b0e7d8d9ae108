//! Payload value model
//!
//! A tagged-union tree (null | bool | number | string | sequence | mapping)
//! with an extra `Shared` variant for reference-counted nodes. Shared nodes
//! allow the same subtree to appear at several places in a payload, which
//! also means a payload can reference one of its own ancestors. Traversal
//! and canonical serialization both detect such cycles and report them as
//! errors instead of recursing forever.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;
use std::sync::Arc;

/// Maximum nesting depth accepted by parsing, traversal and serialization.
///
/// Traversal is recursive; this bound keeps it within a default thread stack
/// in debug builds.
pub const MAX_DEPTH: usize = 128;

/// An arbitrary JSON-like value submitted for validation
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// `null` or an absent value
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Ordered sequence, visited in index order
    Sequence(Vec<Payload>),
    /// Keyed mapping, visited in insertion order
    Mapping(IndexMap<String, Payload>),
    /// Reference-counted node that may be aliased elsewhere in the tree
    Shared(SharedPayload),
}

/// Reference-counted, interiorly mutable payload node
#[derive(Clone, Default)]
pub struct SharedPayload(Arc<RwLock<Payload>>);

impl SharedPayload {
    pub fn new(payload: Payload) -> Self {
        Self(Arc::new(RwLock::new(payload)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Payload> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Payload> {
        self.0.write()
    }

    /// Whether two handles point at the same node
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for SharedPayload {
    // Printing the contents could recurse through a cycle.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedPayload({:#x})", self.addr())
    }
}

/// A primitive reached during traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    Null,
    Bool(bool),
    Number(&'a Number),
    String(&'a str),
}

/// Callback interface for [`Payload::walk`]
pub trait PayloadVisitor {
    fn visit_leaf(&mut self, leaf: Leaf<'_>) -> Result<()>;
}

/// Tracks the shared nodes on the current traversal path.
#[derive(Default)]
struct PathGuard {
    ancestors: Vec<usize>,
}

impl PathGuard {
    fn enter(&mut self, node: &SharedPayload, depth: usize) -> Result<()> {
        let addr = node.addr();
        if self.ancestors.contains(&addr) {
            return Err(Error::CyclicPayload { depth });
        }
        self.ancestors.push(addr);
        Ok(())
    }

    fn leave(&mut self) {
        self.ancestors.pop();
    }
}

fn check_depth(depth: usize) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::DepthLimitExceeded(MAX_DEPTH));
    }
    Ok(())
}

impl Payload {
    /// Build a mapping from key/value pairs, keeping their order
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Payload>,
        I: IntoIterator<Item = (K, V)>,
    {
        Payload::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from values
    pub fn sequence<V, I>(items: I) -> Self
    where
        V: Into<Payload>,
        I: IntoIterator<Item = V>,
    {
        Payload::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Parse a JSON document.
    ///
    /// Documents nesting more than [`MAX_DEPTH`] containers are rejected with
    /// [`Error::DepthLimitExceeded`] before any recursive parsing happens, so
    /// the parser's own recursion limit never applies.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        if json_nesting_depth(bytes) > MAX_DEPTH {
            return Err(Error::DepthLimitExceeded(MAX_DEPTH));
        }
        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let value = serde_json::Value::deserialize(&mut de)?;
        de.end()?;
        Ok(Payload::from(value))
    }

    /// Null, an empty string or an empty container
    pub fn is_vacuous(&self) -> bool {
        match self {
            Payload::Null => true,
            Payload::String(s) => s.is_empty(),
            Payload::Sequence(items) => items.is_empty(),
            Payload::Mapping(entries) => entries.is_empty(),
            Payload::Bool(_) | Payload::Number(_) | Payload::Shared(_) => false,
        }
    }

    /// Wrap this value in a shared node
    pub fn into_shared(self) -> SharedPayload {
        SharedPayload::new(self)
    }

    /// Visit every primitive depth-first.
    ///
    /// Sequences are visited in index order and mappings in insertion order.
    /// Mapping keys are not visited.
    pub fn walk<V: PayloadVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        let mut guard = PathGuard::default();
        self.walk_at(visitor, &mut guard, 0)
    }

    fn walk_at<V: PayloadVisitor + ?Sized>(
        &self,
        visitor: &mut V,
        guard: &mut PathGuard,
        depth: usize,
    ) -> Result<()> {
        check_depth(depth)?;
        match self {
            Payload::Null => visitor.visit_leaf(Leaf::Null),
            Payload::Bool(b) => visitor.visit_leaf(Leaf::Bool(*b)),
            Payload::Number(n) => visitor.visit_leaf(Leaf::Number(n)),
            Payload::String(s) => visitor.visit_leaf(Leaf::String(s)),
            Payload::Sequence(items) => {
                for item in items {
                    item.walk_at(visitor, guard, depth + 1)?;
                }
                Ok(())
            }
            Payload::Mapping(entries) => {
                for value in entries.values() {
                    value.walk_at(visitor, guard, depth + 1)?;
                }
                Ok(())
            }
            Payload::Shared(node) => {
                guard.enter(node, depth)?;
                let result = node.read().walk_at(visitor, guard, depth + 1);
                guard.leave();
                result
            }
        }
    }

    /// Convert to a plain JSON tree with shared nodes inlined.
    ///
    /// Fails on cycles and on nesting deeper than [`MAX_DEPTH`].
    pub fn to_canonical(&self) -> Result<serde_json::Value> {
        let mut guard = PathGuard::default();
        self.canonical_at(&mut guard, 0)
    }

    fn canonical_at(&self, guard: &mut PathGuard, depth: usize) -> Result<serde_json::Value> {
        use serde_json::Value;

        check_depth(depth)?;
        Ok(match self {
            Payload::Null => Value::Null,
            Payload::Bool(b) => Value::Bool(*b),
            Payload::Number(n) => Value::Number(n.clone()),
            Payload::String(s) => Value::String(s.clone()),
            Payload::Sequence(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.canonical_at(guard, depth + 1))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Payload::Mapping(entries) => {
                let mut map = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(key.clone(), value.canonical_at(guard, depth + 1)?);
                }
                Value::Object(map)
            }
            Payload::Shared(node) => {
                guard.enter(node, depth)?;
                let value = node.read().canonical_at(guard, depth + 1);
                guard.leave();
                value?
            }
        })
    }

    /// Length in bytes of the compact canonical JSON encoding
    pub fn canonical_size(&self) -> Result<usize> {
        let value = self.to_canonical()?;
        Ok(serde_json::to_vec(&value)?.len())
    }
}

/// Deepest container nesting of a JSON document, ignoring string contents.
fn json_nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut max = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                max = max.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    max
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Payload::Null,
            Value::Bool(b) => Payload::Bool(b),
            Value::Number(n) => Payload::Number(n),
            Value::String(s) => Payload::String(s),
            Value::Array(items) => Payload::Sequence(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Payload::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload::String(s.to_string())
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload::String(s)
    }
}

impl From<bool> for Payload {
    fn from(b: bool) -> Self {
        Payload::Bool(b)
    }
}

impl From<i64> for Payload {
    fn from(n: i64) -> Self {
        Payload::Number(n.into())
    }
}

impl From<Vec<Payload>> for Payload {
    fn from(items: Vec<Payload>) -> Self {
        Payload::Sequence(items)
    }
}

impl From<SharedPayload> for Payload {
    fn from(node: SharedPayload) -> Self {
        Payload::Shared(node)
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Payload::Null)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_canonical()
            .map_err(<S::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Payload::from)
    }
}
