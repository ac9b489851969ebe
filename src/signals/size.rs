//! Installed size of the resolved version

use crate::error::{AuditError, Result};
use crate::metadata::Packument;
use crate::types::SizeSignal;

/// Size signal for the version a constraint resolves to.
///
/// A resolved version without `unpackedSize` reports an unknown size; a
/// packument with no matching version at all is an error.
pub fn extract(packument: &Packument, constraint: &str) -> Result<SizeSignal> {
    let (_, manifest) = packument.resolve_version(constraint).ok_or_else(|| {
        AuditError::parse(format!(
            "no version of {} matches '{}'",
            packument.name, constraint
        ))
    })?;

    Ok(match manifest.unpacked_size() {
        Some(bytes) => SizeSignal {
            unpacked_size_bytes: bytes,
            unpacked_size_human: format_bytes(bytes),
        },
        None => SizeSignal::unknown(),
    })
}

/// Human-readable size using 1024-based units
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "unknown".to_string();
    }
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
