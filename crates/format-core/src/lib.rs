//! Core encoding library for the seaside binary configuration format.
//!
//! A configuration file is a 12-byte header followed by a flat, ordered
//! sequence of (32-bit hierarchical identifier, bare payload) records. The
//! payload widths come from a schema shared between producer and consumer;
//! the file itself stores no type tags. This crate owns the identifier and
//! value models, the shared schema, the ordered property table, and the
//! encoder/decoder pair.

/// Hierarchical property identifiers and the namespace tree.
pub mod ident;
pub use ident::{Namespace, NamespaceError, NodeId, PropertyId, MAX_GROUP_DEPTH};

/// Property value model and fixed-width packing.
pub mod value;
pub use value::{
    pack_u16_le, pack_u32_le, pack_version, PackedVersion, PropertyValue, ValueError, ValueType,
};

/// The shared identifier-to-type schema.
pub mod schema;
pub use schema::{Schema, SchemaError};

/// Insertion-ordered property table with schema-checked construction.
pub mod table;
pub use table::{PropertyTable, TableError};

/// Serialization to the wire format and exclusive-create file emission.
pub mod writer;
pub use writer::{emit_to_new_file, encode, write_header, write_record, EmitError, HEADER_LEN, MAGIC};

/// Schema-aware decoding of complete file images.
pub mod reader;
pub use reader::{decode, DecodeError};
