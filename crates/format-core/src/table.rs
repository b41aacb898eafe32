//! Insertion-ordered property table with schema-checked construction.

use std::collections::HashMap;

use thiserror::Error;

use crate::ident::PropertyId;
use crate::schema::Schema;
use crate::value::{PropertyValue, ValueError, ValueType};

/// Error while building a property table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// The identifier is not registered in the schema.
    #[error("property {0} is not registered in the schema")]
    UnknownId(PropertyId),
    /// The identifier is already present in the table.
    #[error("property {0} inserted twice")]
    DuplicateId(PropertyId),
    /// The value's type does not match the schema's declaration.
    #[error("property {id} declared as {expected}, got {found}")]
    TypeMismatch {
        /// Offending identifier.
        id: PropertyId,
        /// Type the schema declares.
        expected: ValueType,
        /// Type of the supplied value.
        found: ValueType,
    },
    /// The payload could not be parsed as the declared type.
    #[error(transparent)]
    Value(#[from] ValueError),
}

/// The ordered collection of (identifier, value) pairs making up one file.
///
/// Identifiers are unique and insertion order is preserved into the output
/// stream. Malformed entries are rejected here, at construction time, so a
/// table that exists can always be serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTable {
    entries: Vec<(PropertyId, PropertyValue)>,
    index: HashMap<PropertyId, usize>,
}

impl PropertyTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a typed value, validating it against the schema.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownId`] if the schema does not declare
    /// `id`, [`TableError::TypeMismatch`] if the value's type differs from
    /// the declaration, or [`TableError::DuplicateId`] on reinsertion.
    pub fn insert(
        &mut self,
        schema: &Schema,
        id: PropertyId,
        value: PropertyValue,
    ) -> Result<(), TableError> {
        let declared = schema.value_type(id).ok_or(TableError::UnknownId(id))?;
        if value.value_type() != declared {
            return Err(TableError::TypeMismatch {
                id,
                expected: declared,
                found: value.value_type(),
            });
        }
        if self.index.contains_key(&id) {
            return Err(TableError::DuplicateId(id));
        }
        self.entries.push((id, value));
        let _ = self.index.insert(id, self.entries.len() - 1);
        Ok(())
    }

    /// Inserts a raw payload, parsing it as the schema's declared type.
    ///
    /// This is the entry point for values received as opaque bytes; a
    /// payload whose length does not match the declared width is rejected
    /// here instead of producing a silently malformed file.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownId`] for an undeclared identifier,
    /// [`TableError::Value`] for a payload of the wrong width or content,
    /// or [`TableError::DuplicateId`] on reinsertion.
    pub fn insert_raw(
        &mut self,
        schema: &Schema,
        id: PropertyId,
        payload: &[u8],
    ) -> Result<(), TableError> {
        let declared = schema.value_type(id).ok_or(TableError::UnknownId(id))?;
        let value = PropertyValue::from_bytes(declared, payload)?;
        self.insert(schema, id, value)
    }

    /// Value stored for `id`, if present.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyValue> {
        self.index.get(&id).map(|&slot| &self.entries[slot].1)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyValue)> + '_ {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total payload bytes across all entries (record bodies, without
    /// identifiers or header).
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.entries.iter().map(|(_, value)| value.width()).sum()
    }
}
