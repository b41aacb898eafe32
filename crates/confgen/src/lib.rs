//! Seaside configuration catalog and binary generator library.

use format_core as _;
#[cfg(test)]
use tempfile as _;

/// The authoritative namespace, schema, and default table.
pub mod catalog;
