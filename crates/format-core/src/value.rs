//! Property value model and fixed-width packing.
//!
//! The wire format stores no per-record type tag or length prefix, so every
//! value's width is fixed by its declared [`ValueType`] and shared with the
//! consumer through the schema. This module owns that typing and the
//! little-endian packing rules.

use thiserror::Error;

/// Error while packing or parsing a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValueError {
    /// Payload length does not match the width implied by the declared type.
    #[error("payload width mismatch: expected {expected} bytes, found {found}")]
    WidthMismatch {
        /// Width required by the declared type.
        expected: usize,
        /// Width actually supplied.
        found: usize,
    },
    /// Boolean payload byte was neither 0 nor 1.
    #[error("invalid boolean payload byte 0x{0:02x}")]
    InvalidBool(u8),
    /// A version component exceeds its declared bit width.
    #[error("numeric overflow: {component} value {value} exceeds {max}")]
    NumericOverflow {
        /// Name of the offending component.
        component: &'static str,
        /// Value that was supplied.
        value: u64,
        /// Largest value the component's width can hold.
        max: u64,
    },
}

/// Declared type of a property payload.
///
/// The type fixes the payload width; the file itself never records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ValueType {
    /// Single-byte flag, strictly 0 or 1.
    Bool,
    /// Unsigned 32-bit integer, little-endian.
    U32,
    /// 32-bit simulator address, little-endian.
    Address,
    /// Packed semantic version: patch as LE u16, then minor, then major.
    Version,
}

impl ValueType {
    /// Payload width in bytes for this type.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Bool => 1,
            Self::U32 | Self::Address | Self::Version => 4,
        }
    }

    /// Short lowercase name used in listings and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U32 => "u32",
            Self::Address => "address",
            Self::Version => "version",
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Three-component version packed into four bytes.
///
/// Wire layout is `[patch & 0xFF, patch >> 8, minor, major]`. The same
/// packing is used for the file header's producer version and for version
/// properties inside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PackedVersion {
    /// Major component (one byte on the wire).
    pub major: u8,
    /// Minor component (one byte on the wire).
    pub minor: u8,
    /// Patch component (LE u16 on the wire).
    pub patch: u16,
}

impl PackedVersion {
    /// Builds a version from components already known to fit.
    #[must_use]
    pub const fn new(major: u8, minor: u8, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Builds a version from wide integers, failing loudly on overflow
    /// instead of truncating.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::NumericOverflow`] if `major` or `minor` exceed
    /// 255 or `patch` exceeds 65535.
    pub fn try_new(major: u64, minor: u64, patch: u64) -> Result<Self, ValueError> {
        let major = u8::try_from(major).map_err(|_| ValueError::NumericOverflow {
            component: "major",
            value: major,
            max: u64::from(u8::MAX),
        })?;
        let minor = u8::try_from(minor).map_err(|_| ValueError::NumericOverflow {
            component: "minor",
            value: minor,
            max: u64::from(u8::MAX),
        })?;
        let patch = u16::try_from(patch).map_err(|_| ValueError::NumericOverflow {
            component: "patch",
            value: patch,
            max: u64::from(u16::MAX),
        })?;
        Ok(Self::new(major, minor, patch))
    }

    /// Packs the version into its four wire bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        pack_version(self.major, self.minor, self.patch)
    }

    /// Unpacks a version from its four wire bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            major: bytes[3],
            minor: bytes[2],
            patch: u16::from_le_bytes([bytes[0], bytes[1]]),
        }
    }
}

impl std::fmt::Display for PackedVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// A property's value, tagged with its declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum PropertyValue {
    /// Single-byte flag.
    Bool(bool),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// 32-bit simulator address.
    Address(u32),
    /// Packed three-component version.
    Version(PackedVersion),
}

impl PropertyValue {
    /// The declared type of this value.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        match self {
            Self::Bool(_) => ValueType::Bool,
            Self::U32(_) => ValueType::U32,
            Self::Address(_) => ValueType::Address,
            Self::Version(_) => ValueType::Version,
        }
    }

    /// Encoded payload width in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.value_type().width()
    }

    /// Appends the payload bytes to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            Self::Bool(flag) => buf.push(u8::from(*flag)),
            Self::U32(x) | Self::Address(x) => buf.extend_from_slice(&pack_u32_le(*x)),
            Self::Version(version) => buf.extend_from_slice(&version.to_bytes()),
        }
    }

    /// Returns the payload as a freshly allocated byte vector.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.width());
        self.write_to(&mut buf);
        buf
    }

    /// Parses a payload of declared type `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::WidthMismatch`] if `payload` is not exactly
    /// `ty.width()` bytes, or [`ValueError::InvalidBool`] for a boolean
    /// payload byte other than 0 or 1.
    pub fn from_bytes(ty: ValueType, payload: &[u8]) -> Result<Self, ValueError> {
        if payload.len() != ty.width() {
            return Err(ValueError::WidthMismatch {
                expected: ty.width(),
                found: payload.len(),
            });
        }
        match ty {
            ValueType::Bool => match payload[0] {
                0 => Ok(Self::Bool(false)),
                1 => Ok(Self::Bool(true)),
                byte => Err(ValueError::InvalidBool(byte)),
            },
            ValueType::U32 => Ok(Self::U32(u32::from_le_bytes([
                payload[0], payload[1], payload[2], payload[3],
            ]))),
            ValueType::Address => Ok(Self::Address(u32::from_le_bytes([
                payload[0], payload[1], payload[2], payload[3],
            ]))),
            ValueType::Version => Ok(Self::Version(PackedVersion::from_bytes([
                payload[0], payload[1], payload[2], payload[3],
            ]))),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::U32(x) => write!(f, "{x}"),
            Self::Address(x) => write!(f, "0x{x:08x}"),
            Self::Version(version) => write!(f, "{version}"),
        }
    }
}

/// Packs an unsigned 16-bit integer as two little-endian bytes.
#[must_use]
pub const fn pack_u16_le(x: u16) -> [u8; 2] {
    x.to_le_bytes()
}

/// Packs an unsigned 32-bit integer as four little-endian bytes.
#[must_use]
pub const fn pack_u32_le(x: u32) -> [u8; 4] {
    x.to_le_bytes()
}

/// Packs a three-component version as `[patch_lo, patch_hi, minor, major]`.
#[must_use]
pub const fn pack_version(major: u8, minor: u8, patch: u16) -> [u8; 4] {
    let patch = patch.to_le_bytes();
    [patch[0], patch[1], minor, major]
}
