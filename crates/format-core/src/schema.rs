//! The shared identifier-to-type schema.
//!
//! The wire format is not self-describing: each record is an identifier
//! followed by a bare payload. Encoder and consumer must agree out of band
//! on every property's type and therefore its payload width. This module
//! makes that contract an explicit value instead of an implicit convention.

use std::collections::HashMap;

use thiserror::Error;

use crate::ident::PropertyId;
use crate::value::ValueType;

/// Error while registering schema entries by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The identifier is already registered.
    #[error("property {0} is already registered in the schema")]
    DuplicateId(PropertyId),
}

/// Mapping from property identifier to declared value type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    entries: HashMap<PropertyId, ValueType>,
}

impl Schema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a property's type.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateId`] if `id` is already registered.
    pub fn register(&mut self, id: PropertyId, ty: ValueType) -> Result<(), SchemaError> {
        if self.entries.contains_key(&id) {
            return Err(SchemaError::DuplicateId(id));
        }
        let _ = self.entries.insert(id, ty);
        Ok(())
    }

    /// Declared type of `id`, if registered.
    #[must_use]
    pub fn value_type(&self, id: PropertyId) -> Option<ValueType> {
        self.entries.get(&id).copied()
    }

    /// Declared payload width of `id` in bytes, if registered.
    #[must_use]
    pub fn width(&self, id: PropertyId) -> Option<usize> {
        self.value_type(id).map(ValueType::width)
    }

    /// Number of registered properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the schema is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates registered entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, ValueType)> + '_ {
        self.entries.iter().map(|(&id, &ty)| (id, ty))
    }
}

/// Builds a schema from unique entries; later duplicates overwrite earlier
/// ones. Sources that guarantee uniqueness (the namespace tree) use this;
/// hand-built schemas should prefer [`Schema::register`].
impl FromIterator<(PropertyId, ValueType)> for Schema {
    fn from_iter<I: IntoIterator<Item = (PropertyId, ValueType)>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}
