//! Schema-aware decoding of the seaside wire format.
//!
//! The format carries no self-describing length or type information, so
//! decoding requires the same schema the producer validated against: the
//! schema supplies each record's payload width. Consumers reject files
//! whose magic tag or major version they do not recognize.

use thiserror::Error;

use crate::ident::PropertyId;
use crate::schema::Schema;
use crate::table::{PropertyTable, TableError};
use crate::value::PackedVersion;
use crate::writer::{HEADER_LEN, MAGIC};

/// Error while decoding a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ends before the 12-byte header is complete.
    #[error("truncated header: {found} of {HEADER_LEN} bytes")]
    TruncatedHeader {
        /// Bytes actually present.
        found: usize,
    },
    /// The magic tag or its NUL separator is wrong.
    #[error("bad magic tag")]
    BadMagic,
    /// The producer's major version is not supported.
    #[error("unsupported major version {found} (supported: {supported})")]
    UnsupportedMajor {
        /// Major version found in the header.
        found: u8,
        /// Major version this consumer supports.
        supported: u8,
    },
    /// Input ends in the middle of a record identifier.
    #[error("truncated record identifier at offset {offset}")]
    TruncatedRecordId {
        /// Byte offset of the incomplete identifier.
        offset: usize,
    },
    /// Input ends in the middle of a record payload.
    #[error("truncated payload for {id}: expected {expected} bytes, found {found}")]
    TruncatedPayload {
        /// Record whose payload is incomplete.
        id: PropertyId,
        /// Payload width the schema declares.
        expected: usize,
        /// Bytes actually remaining.
        found: usize,
    },
    /// A record names an identifier the schema does not declare. Without
    /// its width the rest of the stream cannot be framed.
    #[error("unknown property {0}: cannot determine payload width")]
    UnknownId(PropertyId),
    /// A record failed table-level validation (duplicate id, bad payload).
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Decodes a complete file image against `schema`.
///
/// Returns the producer version from the header and the reconstructed
/// table, with entries in stream order.
///
/// # Errors
///
/// Returns a [`DecodeError`] for a short or foreign header, a major
/// version other than `supported_major`, an identifier missing from the
/// schema, a truncated record, a duplicate identifier, or a payload that
/// does not parse as its declared type.
pub fn decode(
    bytes: &[u8],
    schema: &Schema,
    supported_major: u8,
) -> Result<(PackedVersion, PropertyTable), DecodeError> {
    if bytes.len() < HEADER_LEN {
        return Err(DecodeError::TruncatedHeader { found: bytes.len() });
    }
    if bytes[0..7] != MAGIC || bytes[7] != 0x00 {
        return Err(DecodeError::BadMagic);
    }
    let version = PackedVersion::from_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if version.major != supported_major {
        return Err(DecodeError::UnsupportedMajor {
            found: version.major,
            supported: supported_major,
        });
    }

    let mut table = PropertyTable::new();
    let mut offset = HEADER_LEN;
    while offset < bytes.len() {
        let Some(id_bytes) = bytes.get(offset..offset + 4) else {
            return Err(DecodeError::TruncatedRecordId { offset });
        };
        let id = PropertyId::from_u32(u32::from_le_bytes([
            id_bytes[0],
            id_bytes[1],
            id_bytes[2],
            id_bytes[3],
        ]));
        offset += 4;

        let width = schema.width(id).ok_or(DecodeError::UnknownId(id))?;
        let Some(payload) = bytes.get(offset..offset + width) else {
            return Err(DecodeError::TruncatedPayload {
                id,
                expected: width,
                found: bytes.len() - offset,
            });
        };
        offset += width;

        table.insert_raw(schema, id, payload)?;
    }

    Ok((version, table))
}

#[cfg(test)]
mod tests {
    use super::{decode, DecodeError};
    use crate::ident::PropertyId;
    use crate::schema::Schema;
    use crate::table::{PropertyTable, TableError};
    use crate::value::{PackedVersion, PropertyValue, ValueType};
    use crate::writer::encode;

    const TOOL_MAJOR: u8 = 1;

    fn fixture() -> (Schema, PropertyTable) {
        let mut schema = Schema::new();
        let version = PropertyId::from_u32(0x0000_0000);
        let flag = PropertyId::from_u32(0x0100_0004);
        let base = PropertyId::from_u32(0x0202_0000);
        schema.register(version, ValueType::Version).unwrap();
        schema.register(flag, ValueType::Bool).unwrap();
        schema.register(base, ValueType::Address).unwrap();

        let mut table = PropertyTable::new();
        table
            .insert(
                &schema,
                version,
                PropertyValue::Version(PackedVersion::new(1, 2, 0)),
            )
            .unwrap();
        table.insert(&schema, flag, PropertyValue::Bool(true)).unwrap();
        table
            .insert(&schema, base, PropertyValue::Address(0x8000_0000))
            .unwrap();
        (schema, table)
    }

    #[test]
    fn roundtrips_fixture_table() {
        let (schema, table) = fixture();
        let version = PackedVersion::new(TOOL_MAJOR, 0, 0);
        let bytes = encode(&table, version);
        let (decoded_version, decoded) = decode(&bytes, &schema, TOOL_MAJOR).unwrap();
        assert_eq!(decoded_version, version);
        assert_eq!(decoded, table);
    }

    #[test]
    fn empty_file_is_empty_table() {
        let schema = Schema::new();
        let bytes = encode(&PropertyTable::new(), PackedVersion::new(1, 0, 0));
        let (_, decoded) = decode(&bytes, &schema, TOOL_MAJOR).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn short_input_is_truncated_header() {
        let schema = Schema::new();
        assert_eq!(
            decode(b"seaside", &schema, TOOL_MAJOR),
            Err(DecodeError::TruncatedHeader { found: 7 })
        );
    }

    #[test]
    fn foreign_magic_is_rejected() {
        let schema = Schema::new();
        let mut bytes = encode(&PropertyTable::new(), PackedVersion::new(1, 0, 0));
        bytes[0] = b'S';
        assert_eq!(decode(&bytes, &schema, TOOL_MAJOR), Err(DecodeError::BadMagic));

        let mut bytes = encode(&PropertyTable::new(), PackedVersion::new(1, 0, 0));
        bytes[7] = 0xff;
        assert_eq!(decode(&bytes, &schema, TOOL_MAJOR), Err(DecodeError::BadMagic));
    }

    #[test]
    fn newer_major_is_rejected() {
        let schema = Schema::new();
        let bytes = encode(&PropertyTable::new(), PackedVersion::new(2, 0, 0));
        assert_eq!(
            decode(&bytes, &schema, TOOL_MAJOR),
            Err(DecodeError::UnsupportedMajor {
                found: 2,
                supported: TOOL_MAJOR,
            })
        );
    }

    #[test]
    fn undeclared_identifier_is_rejected() {
        let (schema, table) = fixture();
        let mut bytes = encode(&table, PackedVersion::new(TOOL_MAJOR, 0, 0));
        // Rewrite the first record's identifier to something undeclared.
        bytes[12..16].copy_from_slice(&0x7f7f_7f7fu32.to_le_bytes());
        assert_eq!(
            decode(&bytes, &schema, TOOL_MAJOR),
            Err(DecodeError::UnknownId(PropertyId::from_u32(0x7f7f_7f7f)))
        );
    }

    #[test]
    fn truncated_record_is_rejected() {
        let (schema, table) = fixture();
        let bytes = encode(&table, PackedVersion::new(TOOL_MAJOR, 0, 0));

        // Cut inside the last record's payload.
        let cut = &bytes[..bytes.len() - 2];
        assert!(matches!(
            decode(cut, &schema, TOOL_MAJOR),
            Err(DecodeError::TruncatedPayload { expected: 4, .. })
        ));

        // Cut inside a record identifier.
        let cut = &bytes[..14];
        assert!(matches!(
            decode(cut, &schema, TOOL_MAJOR),
            Err(DecodeError::TruncatedRecordId { offset: 12 })
        ));
    }

    #[test]
    fn duplicate_record_is_rejected() {
        let mut schema = Schema::new();
        let flag = PropertyId::from_u32(0x0100_0000);
        schema.register(flag, ValueType::Bool).unwrap();

        let mut bytes = Vec::new();
        crate::writer::write_header(&mut bytes, PackedVersion::new(TOOL_MAJOR, 0, 0));
        crate::writer::write_record(&mut bytes, flag, &PropertyValue::Bool(true));
        crate::writer::write_record(&mut bytes, flag, &PropertyValue::Bool(false));

        assert_eq!(
            decode(&bytes, &schema, TOOL_MAJOR),
            Err(DecodeError::Table(TableError::DuplicateId(flag)))
        );
    }

    #[test]
    fn stream_order_is_preserved_even_when_descending() {
        let mut schema = Schema::new();
        let high = PropertyId::from_u32(0x0301_0001);
        let low = PropertyId::from_u32(0x0000_0001);
        schema.register(high, ValueType::U32).unwrap();
        schema.register(low, ValueType::Bool).unwrap();

        let mut table = PropertyTable::new();
        table.insert(&schema, high, PropertyValue::U32(7)).unwrap();
        table.insert(&schema, low, PropertyValue::Bool(false)).unwrap();

        let bytes = encode(&table, PackedVersion::new(TOOL_MAJOR, 0, 0));
        let (_, decoded) = decode(&bytes, &schema, TOOL_MAJOR).unwrap();
        let order: Vec<PropertyId> = decoded.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![high, low]);
    }
}
