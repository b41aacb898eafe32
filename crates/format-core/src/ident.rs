//! Hierarchical property identifiers and the namespace tree.
//!
//! An identifier is a 32-bit path through a namespace tree at most four
//! levels deep: domain, subsystem, group, and leaf, one byte per level from
//! most to least significant. Interior bytes left at zero mean "this node
//! itself", so a node at any depth can carry its own properties alongside
//! deeper children. The tree is the authoritative model; the flat integer
//! is a derived, serializable summary of the root-to-leaf path.

use std::collections::HashMap;

use thiserror::Error;

use crate::schema::Schema;
use crate::value::ValueType;

/// Maximum number of interior levels below the root (domain, subsystem,
/// group). The fourth identifier byte is always the leaf index.
pub const MAX_GROUP_DEPTH: usize = 3;

/// Error while building a namespace tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// Child group index 0 is reserved to mean "this node itself".
    #[error("group index 0 is reserved for the node's own properties")]
    ReservedGroupIndex,
    /// Adding a child here would exceed the four-level identifier.
    #[error("namespace depth limit exceeded (at most {MAX_GROUP_DEPTH} group levels)")]
    DepthExceeded,
    /// Two children of the same node share a local index.
    #[error("duplicate group index 0x{0:02x} under the same parent")]
    DuplicateGroupIndex(u8),
    /// Two properties of the same node share a leaf index.
    #[error("duplicate leaf index 0x{0:02x} on the same node")]
    DuplicateLeafIndex(u8),
}

/// Flat 32-bit identifier naming one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PropertyId(u32);

impl PropertyId {
    /// Composes an identifier from its four path bytes.
    #[must_use]
    pub const fn from_parts(domain: u8, subsystem: u8, group: u8, leaf: u8) -> Self {
        Self(u32::from_be_bytes([domain, subsystem, group, leaf]))
    }

    /// Wraps a raw identifier read from the wire.
    #[must_use]
    pub const fn from_u32(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw 32-bit value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Top-level domain byte.
    #[must_use]
    pub const fn domain(self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Subsystem byte.
    #[must_use]
    pub const fn subsystem(self) -> u8 {
        self.0.to_be_bytes()[1]
    }

    /// Group byte.
    #[must_use]
    pub const fn group(self) -> u8 {
        self.0.to_be_bytes()[2]
    }

    /// Leaf property index.
    #[must_use]
    pub const fn leaf(self) -> u8 {
        self.0.to_be_bytes()[3]
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

/// Handle to an interior node of a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

/// A declared property: its tree position, name, and value type.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PropertyDecl {
    node: NodeId,
    leaf: u8,
    name: String,
    ty: ValueType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    parent: Option<NodeId>,
    index: u8,
    name: String,
}

/// Arena-backed namespace tree.
///
/// Groups are added with non-zero local indices; properties are declared
/// directly on the node that owns them. Identifier uniqueness follows from
/// (path, leaf) uniqueness, which the builder enforces, so derived
/// identifiers never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    nodes: Vec<Node>,
    properties: Vec<PropertyDecl>,
    by_id: HashMap<PropertyId, usize>,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    /// Creates an empty namespace holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                index: 0,
                name: String::new(),
            }],
            properties: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// The root node.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn depth(&self, node: NodeId) -> usize {
        let mut depth = 0;
        let mut current = node;
        while let Some(parent) = self.nodes[current.0].parent {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Path bytes of `node` from the root down, without the leaf byte.
    fn path(&self, node: NodeId) -> [u8; MAX_GROUP_DEPTH] {
        let mut bytes = [0u8; MAX_GROUP_DEPTH];
        let mut current = node;
        let mut depth = self.depth(node);
        while let Some(parent) = self.nodes[current.0].parent {
            depth -= 1;
            bytes[depth] = self.nodes[current.0].index;
            current = parent;
        }
        bytes
    }

    /// Adds a child group under `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::ReservedGroupIndex`] for index 0,
    /// [`NamespaceError::DepthExceeded`] below the third group level, or
    /// [`NamespaceError::DuplicateGroupIndex`] if the index is taken.
    pub fn add_group(
        &mut self,
        parent: NodeId,
        index: u8,
        name: &str,
    ) -> Result<NodeId, NamespaceError> {
        if index == 0 {
            return Err(NamespaceError::ReservedGroupIndex);
        }
        if self.depth(parent) >= MAX_GROUP_DEPTH {
            return Err(NamespaceError::DepthExceeded);
        }
        let taken = self
            .nodes
            .iter()
            .any(|node| node.parent == Some(parent) && node.index == index);
        if taken {
            return Err(NamespaceError::DuplicateGroupIndex(index));
        }
        self.nodes.push(Node {
            parent: Some(parent),
            index,
            name: name.to_owned(),
        });
        Ok(NodeId(self.nodes.len() - 1))
    }

    /// Declares a property on `node` and returns its derived identifier.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::DuplicateLeafIndex`] if `node` already has
    /// a property with this leaf index.
    pub fn declare(
        &mut self,
        node: NodeId,
        leaf: u8,
        name: &str,
        ty: ValueType,
    ) -> Result<PropertyId, NamespaceError> {
        let id = self.property_id(node, leaf);
        if self.by_id.contains_key(&id) {
            return Err(NamespaceError::DuplicateLeafIndex(leaf));
        }
        self.properties.push(PropertyDecl {
            node,
            leaf,
            name: name.to_owned(),
            ty,
        });
        let _ = self.by_id.insert(id, self.properties.len() - 1);
        Ok(id)
    }

    /// Derives the flat identifier for a property of `node` at `leaf`.
    #[must_use]
    pub fn property_id(&self, node: NodeId, leaf: u8) -> PropertyId {
        let path = self.path(node);
        PropertyId::from_parts(path[0], path[1], path[2], leaf)
    }

    /// Declared value type of a property, if declared.
    #[must_use]
    pub fn value_type(&self, id: PropertyId) -> Option<ValueType> {
        self.by_id.get(&id).map(|&slot| self.properties[slot].ty)
    }

    /// Dot-separated full name of a property, if declared.
    #[must_use]
    pub fn full_name(&self, id: PropertyId) -> Option<String> {
        let decl = &self.properties[*self.by_id.get(&id)?];
        let mut segments = Vec::new();
        let mut current = Some(decl.node);
        while let Some(node) = current {
            if self.nodes[node.0].parent.is_some() {
                segments.push(self.nodes[node.0].name.as_str());
            }
            current = self.nodes[node.0].parent;
        }
        segments.reverse();
        segments.push(decl.name.as_str());
        Some(segments.join("."))
    }

    /// Iterates declared properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (PropertyId, &str, ValueType)> + '_ {
        self.properties
            .iter()
            .map(|decl| (self.property_id(decl.node, decl.leaf), decl.name.as_str(), decl.ty))
    }

    /// Number of declared properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no properties have been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Derives the shared schema from all declared properties.
    #[must_use]
    pub fn schema(&self) -> Schema {
        self.properties().map(|(id, _, ty)| (id, ty)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{Namespace, NamespaceError, PropertyId};
    use crate::value::ValueType;

    #[test]
    fn id_byte_composition() {
        let id = PropertyId::from_parts(0x01, 0x02, 0x03, 0x04);
        assert_eq!(id.as_u32(), 0x0102_0304);
        assert_eq!(id.domain(), 0x01);
        assert_eq!(id.subsystem(), 0x02);
        assert_eq!(id.group(), 0x03);
        assert_eq!(id.leaf(), 0x04);
    }

    #[test]
    fn root_properties_use_zero_path() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let version = ns.declare(root, 0x00, "version", ValueType::Version).unwrap();
        let endian = ns.declare(root, 0x01, "endian", ValueType::Bool).unwrap();
        assert_eq!(version.as_u32(), 0x0000_0000);
        assert_eq!(endian.as_u32(), 0x0000_0001);
    }

    #[test]
    fn derived_ids_compose_path_bytes() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let features = ns.add_group(root, 0x01, "features").unwrap();
        let syscalls = ns.add_group(features, 0x02, "syscalls").unwrap();
        let print = ns.add_group(syscalls, 0x01, "mars_print").unwrap();

        let own = ns.declare(features, 0x00, "kernel_space_accessible", ValueType::Bool);
        assert_eq!(own.unwrap().as_u32(), 0x0100_0000);

        let int = ns.declare(print, 0x00, "int", ValueType::U32);
        assert_eq!(int.unwrap().as_u32(), 0x0102_0100);
    }

    #[test]
    fn group_index_zero_is_reserved() {
        let mut ns = Namespace::new();
        let root = ns.root();
        assert_eq!(
            ns.add_group(root, 0x00, "self"),
            Err(NamespaceError::ReservedGroupIndex)
        );
    }

    #[test]
    fn depth_is_limited_to_three_group_levels() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let a = ns.add_group(root, 0x01, "a").unwrap();
        let b = ns.add_group(a, 0x01, "b").unwrap();
        let c = ns.add_group(b, 0x01, "c").unwrap();
        assert_eq!(ns.add_group(c, 0x01, "d"), Err(NamespaceError::DepthExceeded));
    }

    #[test]
    fn duplicate_indices_are_rejected() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let _ = ns.add_group(root, 0x01, "features").unwrap();
        assert_eq!(
            ns.add_group(root, 0x01, "again"),
            Err(NamespaceError::DuplicateGroupIndex(0x01))
        );

        let _ = ns.declare(root, 0x00, "version", ValueType::Version).unwrap();
        assert_eq!(
            ns.declare(root, 0x00, "version", ValueType::Version),
            Err(NamespaceError::DuplicateLeafIndex(0x00))
        );
    }

    #[test]
    fn full_names_are_dotted_paths() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let map = ns.add_group(root, 0x02, "memory_map").unwrap();
        let user = ns.add_group(map, 0x01, "user_space").unwrap();
        let base = ns.declare(user, 0x00, "base", ValueType::Address).unwrap();
        assert_eq!(ns.full_name(base).as_deref(), Some("memory_map.user_space.base"));

        let version = ns.declare(root, 0x00, "version", ValueType::Version).unwrap();
        assert_eq!(ns.full_name(version).as_deref(), Some("version"));
    }

    #[test]
    fn schema_covers_all_declarations() {
        let mut ns = Namespace::new();
        let root = ns.root();
        let version = ns.declare(root, 0x00, "version", ValueType::Version).unwrap();
        let features = ns.add_group(root, 0x01, "features").unwrap();
        let flag = ns.declare(features, 0x00, "flag", ValueType::Bool).unwrap();

        let schema = ns.schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.value_type(version), Some(ValueType::Version));
        assert_eq!(schema.value_type(flag), Some(ValueType::Bool));
    }
}
