//! The authoritative seaside configuration catalog.
//!
//! This module is declarative data: it builds the namespace tree for every
//! property the simulator understands and fills in the shipped default
//! values. The tree is the source of truth; flat identifiers, the shared
//! schema, and dotted names for listings are all derived from it.
//!
//! Catalog insertion order is ascending identifier order. The format only
//! promises stable-as-inserted order, but ascending keeps the generated
//! file diffable against earlier releases.

use format_core::{
    Namespace, NamespaceError, NodeId, PackedVersion, PropertyId, PropertyTable, PropertyValue,
    Schema, TableError, ValueType,
};

/// Version of the generator/format, written to the file header. Consumers
/// gate on the major component.
pub const TOOL_VERSION: PackedVersion = PackedVersion::new(1, 0, 0);

/// Configuration-content version, stored at identifier `0x00000000`.
pub const SEASIDE_VERSION: PackedVersion = PackedVersion::new(1, 2, 0);

const KIB: u32 = 1024;
const MIB: u32 = KIB * KIB;

/// Error while assembling the catalog.
///
/// The catalog is static, so these indicate an inconsistency in the
/// declarations themselves (a duplicated index or identifier), not bad
/// runtime input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogError {
    /// A namespace declaration collided.
    Namespace(NamespaceError),
    /// A default value failed table validation.
    Table(TableError),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespace(error) => write!(f, "catalog namespace error: {error}"),
            Self::Table(error) => write!(f, "catalog default value error: {error}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Namespace(error) => Some(error),
            Self::Table(error) => Some(error),
        }
    }
}

impl From<NamespaceError> for CatalogError {
    fn from(error: NamespaceError) -> Self {
        Self::Namespace(error)
    }
}

impl From<TableError> for CatalogError {
    fn from(error: TableError) -> Self {
        Self::Table(error)
    }
}

/// The built catalog: namespace, derived schema, and default table.
#[derive(Debug, Clone)]
pub struct Catalog {
    namespace: Namespace,
    schema: Schema,
    table: PropertyTable,
}

impl Catalog {
    /// Builds the full seaside catalog with shipped defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the declarations are internally
    /// inconsistent; a successfully compiled release build never hits this
    /// at runtime, but the error is propagated rather than panicking.
    pub fn build() -> Result<Self, CatalogError> {
        let mut builder = Builder::new();
        builder.declare_root()?;
        builder.declare_features()?;
        builder.declare_memory_map()?;
        builder.declare_register_defaults()?;
        builder.finish()
    }

    /// The namespace tree.
    #[must_use]
    pub const fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// The derived schema shared with consumers.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The default property table, in ascending identifier order.
    #[must_use]
    pub const fn table(&self) -> &PropertyTable {
        &self.table
    }

    /// Dotted full name of a property, if the catalog declares it.
    #[must_use]
    pub fn full_name(&self, id: PropertyId) -> Option<String> {
        self.namespace.full_name(id)
    }
}

/// Two-phase builder: declarations collect (identifier, default) pairs,
/// then `finish` derives the schema and validates every default against it.
struct Builder {
    ns: Namespace,
    defaults: Vec<(PropertyId, PropertyValue)>,
}

impl Builder {
    fn new() -> Self {
        Self {
            ns: Namespace::new(),
            defaults: Vec::new(),
        }
    }

    fn flag(
        &mut self,
        node: NodeId,
        leaf: u8,
        name: &str,
        default: bool,
    ) -> Result<(), NamespaceError> {
        let id = self.ns.declare(node, leaf, name, ValueType::Bool)?;
        self.defaults.push((id, PropertyValue::Bool(default)));
        Ok(())
    }

    fn word(
        &mut self,
        node: NodeId,
        leaf: u8,
        name: &str,
        default: u32,
    ) -> Result<(), NamespaceError> {
        let id = self.ns.declare(node, leaf, name, ValueType::U32)?;
        self.defaults.push((id, PropertyValue::U32(default)));
        Ok(())
    }

    fn address(
        &mut self,
        node: NodeId,
        leaf: u8,
        name: &str,
        default: u32,
    ) -> Result<(), NamespaceError> {
        let id = self.ns.declare(node, leaf, name, ValueType::Address)?;
        self.defaults.push((id, PropertyValue::Address(default)));
        Ok(())
    }

    fn version(
        &mut self,
        node: NodeId,
        leaf: u8,
        name: &str,
        default: PackedVersion,
    ) -> Result<(), NamespaceError> {
        let id = self.ns.declare(node, leaf, name, ValueType::Version)?;
        self.defaults.push((id, PropertyValue::Version(default)));
        Ok(())
    }

    fn declare_root(&mut self) -> Result<(), NamespaceError> {
        let root = self.ns.root();
        self.version(root, 0x00, "version", SEASIDE_VERSION)?;
        // 0 = little-endian, the only byte order the simulator ships with.
        self.flag(root, 0x01, "endian", false)?;
        self.flag(root, 0x02, "project_directory_is_cwd", true)
    }

    fn declare_features(&mut self) -> Result<(), NamespaceError> {
        let features = self.ns.add_group(self.ns.root(), 0x01, "features")?;
        self.flag(features, 0x00, "kernel_space_accessible", true)?;
        self.flag(features, 0x01, "self_modifying_code", false)?;
        self.flag(features, 0x02, "delay_slot", false)?;
        self.flag(features, 0x03, "freeable_heap_allocations", true)?;
        self.flag(features, 0x04, "show_crash_handler", true)?;

        let assembler = self.ns.add_group(features, 0x01, "assembler")?;
        self.flag(assembler, 0x00, "pseudo_instructions", false)?;

        let directives = self.ns.add_group(assembler, 0x01, "directives")?;
        self.flag(directives, 0x00, "asciiz", true)?;
        self.flag(directives, 0x01, "eqv", false)?;
        self.flag(directives, 0x02, "global", true)?;
        self.flag(directives, 0x03, "include", true)?;
        self.flag(directives, 0x04, "macros", false)?;
        self.flag(directives, 0x05, "set", false)?;

        self.declare_syscalls(features)
    }

    /// MARS-compatible service numbers for each syscall group.
    fn declare_syscalls(&mut self, features: NodeId) -> Result<(), NamespaceError> {
        let syscalls = self.ns.add_group(features, 0x02, "syscalls")?;

        let print = self.ns.add_group(syscalls, 0x01, "mars_print")?;
        self.word(print, 0x00, "int", 1)?;
        self.word(print, 0x01, "uint", 36)?;
        self.word(print, 0x02, "bin", 35)?;
        self.word(print, 0x03, "hex", 34)?;
        self.word(print, 0x04, "float", 2)?;
        self.word(print, 0x05, "double", 3)?;
        self.word(print, 0x06, "char", 11)?;
        self.word(print, 0x07, "string", 4)?;

        let read = self.ns.add_group(syscalls, 0x02, "mars_read")?;
        self.word(read, 0x00, "int", 5)?;
        self.word(read, 0x01, "float", 6)?;
        self.word(read, 0x02, "double", 7)?;
        self.word(read, 0x03, "char", 12)?;
        self.word(read, 0x04, "string", 8)?;

        let file = self.ns.add_group(syscalls, 0x03, "mars_file")?;
        self.word(file, 0x00, "open", 13)?;
        self.word(file, 0x01, "read", 14)?;
        self.word(file, 0x02, "write", 15)?;
        self.word(file, 0x03, "close", 16)?;

        let input_dialog = self.ns.add_group(syscalls, 0x04, "mars_input_dialog")?;
        self.word(input_dialog, 0x00, "confirm", 50)?;
        self.word(input_dialog, 0x01, "int", 51)?;
        self.word(input_dialog, 0x02, "float", 52)?;
        self.word(input_dialog, 0x03, "double", 53)?;
        self.word(input_dialog, 0x04, "string", 54)?;

        let message_dialog = self.ns.add_group(syscalls, 0x05, "mars_message_dialog")?;
        self.word(message_dialog, 0x00, "general", 55)?;
        self.word(message_dialog, 0x01, "int", 56)?;
        self.word(message_dialog, 0x02, "float", 57)?;
        self.word(message_dialog, 0x03, "double", 58)?;
        self.word(message_dialog, 0x04, "string", 59)?;

        let system = self.ns.add_group(syscalls, 0x06, "mars_system")?;
        self.word(system, 0x00, "sbrk", 9)?;
        self.word(system, 0x01, "exit", 10)?;
        self.word(system, 0x02, "exit_2", 17)?;
        self.word(system, 0x03, "time", 30)?;
        self.word(system, 0x04, "sleep", 32)?;
        self.word(system, 0x05, "midi_out", 31)?;
        self.word(system, 0x06, "midi_out_sync", 33)?;

        let random = self.ns.add_group(syscalls, 0x07, "mars_random")?;
        self.word(random, 0x00, "set_seed", 40)?;
        self.word(random, 0x01, "rand_int", 41)?;
        self.word(random, 0x02, "rand_int_range", 42)?;
        self.word(random, 0x03, "rand_float", 43)?;
        self.word(random, 0x04, "rand_double", 44)
    }

    fn declare_memory_map(&mut self) -> Result<(), NamespaceError> {
        let map = self.ns.add_group(self.ns.root(), 0x02, "memory_map")?;
        self.address(map, 0x00, "exception_handler", 0x8000_0180)?;

        let user_space = self.ns.add_group(map, 0x01, "user_space")?;
        self.address(user_space, 0x00, "base", 0x0000_0000)?;
        self.address(user_space, 0x01, "limit", 0x7fff_ffff)?;

        let kernel_space = self.ns.add_group(map, 0x02, "kernel_space")?;
        self.address(kernel_space, 0x00, "base", 0x8000_0000)?;
        self.address(kernel_space, 0x01, "limit", 0xffff_ffff)?;

        let segments = self.ns.add_group(map, 0x03, "segments")?;

        let text = self.ns.add_group(segments, 0x01, "text")?;
        self.address(text, 0x00, "base", 0x0040_0000)?;
        self.address(text, 0x01, "limit", 0x0fff_fffc)?;
        self.word(text, 0x02, "allocate", 8 * MIB)?;

        let r#extern = self.ns.add_group(segments, 0x02, "extern")?;
        self.address(r#extern, 0x00, "base", 0x1000_0000)?;
        self.address(r#extern, 0x01, "limit", 0x1000_ffff)?;
        self.word(r#extern, 0x02, "allocate", 64 * KIB)?;

        let data = self.ns.add_group(segments, 0x03, "data")?;
        self.address(data, 0x00, "base", 0x1001_0000)?;
        self.address(data, 0x01, "limit", 0x1003_ffff)?;
        self.word(data, 0x02, "allocate", 192 * KIB)?;

        let runtime_data = self.ns.add_group(segments, 0x04, "runtime_data")?;
        self.address(runtime_data, 0x00, "base", 0x1004_0000)?;
        self.address(runtime_data, 0x01, "limit", 0x7fff_ffff)?;
        self.word(runtime_data, 0x02, "heap_size", 128 * KIB)?;
        self.word(runtime_data, 0x03, "stack_size", 4 * MIB)?;

        let ktext = self.ns.add_group(segments, 0x05, "ktext")?;
        self.address(ktext, 0x00, "base", 0x8000_0000)?;
        self.address(ktext, 0x01, "limit", 0x8fff_ffff)?;
        self.word(ktext, 0x02, "allocate", MIB)?;

        let kdata = self.ns.add_group(segments, 0x06, "kdata")?;
        self.address(kdata, 0x00, "base", 0x9000_0000)?;
        self.address(kdata, 0x01, "limit", 0xfffe_ffff)?;
        self.word(kdata, 0x02, "allocate", MIB)?;

        let mmio = self.ns.add_group(segments, 0x07, "mmio")?;
        self.address(mmio, 0x00, "base", 0xffff_0000)?;
        self.address(mmio, 0x01, "limit", 0xffff_ffff)?;
        self.word(mmio, 0x02, "allocate", 4 * KIB)
    }

    fn declare_register_defaults(&mut self) -> Result<(), NamespaceError> {
        // Leaf indices follow hardware register numbers; $zero has no
        // default because writes to it never land.
        const GENERAL_PURPOSE: [(u8, &str, u32); 31] = [
            (0x01, "at", 0x0000_0000),
            (0x02, "v0", 0x0000_0000),
            (0x03, "v1", 0x0000_0000),
            (0x04, "a0", 0x0000_0000),
            (0x05, "a1", 0x0000_0000),
            (0x06, "a2", 0x0000_0000),
            (0x07, "a3", 0x0000_0000),
            (0x08, "t0", 0x0000_0000),
            (0x09, "t1", 0x0000_0000),
            (0x0a, "t2", 0x0000_0000),
            (0x0b, "t3", 0x0000_0000),
            (0x0c, "t4", 0x0000_0000),
            (0x0d, "t5", 0x0000_0000),
            (0x0e, "t6", 0x0000_0000),
            (0x0f, "t7", 0x0000_0000),
            (0x10, "s0", 0x0000_0000),
            (0x11, "s1", 0x0000_0000),
            (0x12, "s2", 0x0000_0000),
            (0x13, "s3", 0x0000_0000),
            (0x14, "s4", 0x0000_0000),
            (0x15, "s5", 0x0000_0000),
            (0x16, "s6", 0x0000_0000),
            (0x17, "s7", 0x0000_0000),
            (0x18, "t8", 0x0000_0000),
            (0x19, "t9", 0x0000_0000),
            (0x1a, "k0", 0x0000_0000),
            (0x1b, "k1", 0x0000_0000),
            (0x1c, "gp", 0x1000_8000),
            (0x1d, "sp", 0x7fff_effc),
            (0x1e, "fp", 0x0000_0000),
            (0x1f, "ra", 0x0000_0000),
        ];

        let defaults = self.ns.add_group(self.ns.root(), 0x03, "register_defaults")?;

        let general_purpose = self.ns.add_group(defaults, 0x01, "general_purpose")?;
        for (leaf, name, value) in GENERAL_PURPOSE {
            self.word(general_purpose, leaf, name, value)?;
        }

        let coprocessor_0 = self.ns.add_group(defaults, 0x02, "coprocessor_0")?;
        self.word(coprocessor_0, 0x08, "vaddr", 0x0000_0000)?;
        self.word(coprocessor_0, 0x0c, "status", 0x0000_ff11)?;
        self.word(coprocessor_0, 0x0d, "cause", 0x0000_0000)?;
        self.word(coprocessor_0, 0x0e, "epc", 0x0000_0000)?;

        let coprocessor_1 = self.ns.add_group(defaults, 0x03, "coprocessor_1")?;
        for leaf in 0x00u8..=0x1f {
            self.word(coprocessor_1, leaf, &format!("f{leaf}"), 0x0000_0000)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<Catalog, CatalogError> {
        let schema = self.ns.schema();
        let mut table = PropertyTable::new();
        for (id, value) in self.defaults {
            table.insert(&schema, id, value)?;
        }
        Ok(Catalog {
            namespace: self.ns,
            schema,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use format_core::{decode, encode, PropertyId, PropertyValue, HEADER_LEN};

    use super::{Catalog, SEASIDE_VERSION, TOOL_VERSION};

    #[test]
    fn catalog_has_expected_shape() {
        let catalog = Catalog::build().unwrap();
        assert_eq!(catalog.table().len(), 148);
        assert_eq!(catalog.schema().len(), 148);
        assert_eq!(catalog.namespace().len(), 148);
    }

    #[test]
    fn catalog_order_is_ascending_and_unique() {
        let catalog = Catalog::build().unwrap();
        let ids: Vec<u32> = catalog.table().iter().map(|(id, _)| id.as_u32()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn known_identifiers_and_defaults() {
        let catalog = Catalog::build().unwrap();
        let table = catalog.table();

        assert_eq!(
            table.get(PropertyId::from_u32(0x0000_0000)),
            Some(&PropertyValue::Version(SEASIDE_VERSION))
        );
        assert_eq!(
            table.get(PropertyId::from_u32(0x0102_0101)),
            Some(&PropertyValue::U32(36)),
            "mars_print.uint service number"
        );
        assert_eq!(
            table.get(PropertyId::from_u32(0x0200_0000)),
            Some(&PropertyValue::Address(0x8000_0180)),
            "exception handler address"
        );
        assert_eq!(
            table.get(PropertyId::from_u32(0x0301_001d)),
            Some(&PropertyValue::U32(0x7fff_effc)),
            "stack pointer reset value"
        );
        assert_eq!(
            table.get(PropertyId::from_u32(0x0302_000c)),
            Some(&PropertyValue::U32(0x0000_ff11)),
            "cp0 status reset value"
        );
        assert_eq!(
            table.get(PropertyId::from_u32(0x0303_001f)),
            Some(&PropertyValue::U32(0)),
            "f31 reset value"
        );
    }

    #[test]
    fn full_names_resolve() {
        let catalog = Catalog::build().unwrap();
        assert_eq!(
            catalog.full_name(PropertyId::from_u32(0x0102_0100)).as_deref(),
            Some("features.syscalls.mars_print.int")
        );
        assert_eq!(
            catalog.full_name(PropertyId::from_u32(0x0101_0103)).as_deref(),
            Some("features.assembler.directives.include")
        );
        assert_eq!(
            catalog.full_name(PropertyId::from_u32(0x0000_0001)).as_deref(),
            Some("endian")
        );
    }

    #[test]
    fn encoded_catalog_has_fixed_size_and_roundtrips() {
        let catalog = Catalog::build().unwrap();
        let bytes = encode(catalog.table(), TOOL_VERSION);

        // 148 records: 14 one-byte flags, 134 four-byte payloads.
        assert_eq!(bytes.len(), HEADER_LEN + 148 * 4 + 14 + 134 * 4);

        // Header, then the content version property at id 0.
        assert_eq!(&bytes[0..8], b"seaside\x00");
        assert_eq!(&bytes[8..12], &[0x00, 0x00, 0x00, 0x01]);
        assert_eq!(&bytes[12..16], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[16..20], &[0x00, 0x00, 0x02, 0x01]);

        let (version, decoded) =
            decode(&bytes, catalog.schema(), TOOL_VERSION.major).unwrap();
        assert_eq!(version, TOOL_VERSION);
        assert_eq!(&decoded, catalog.table());
    }
}
