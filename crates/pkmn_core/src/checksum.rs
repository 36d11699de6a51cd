use serde::{Deserialize, Serialize};

use crate::bytes::LeBytes;
use crate::error::CoreError;
use crate::layout::{ChecksumSpec, ChecksumWidth};
use crate::{gen1, gen2};

/// One computed-vs-stored comparison. Produced fresh on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumResult {
    pub width: ChecksumWidth,
    pub location: usize,
    pub sum: u32,
    pub computed: u16,
    pub stored: u16,
    pub matches: bool,
}

impl ChecksumResult {
    pub fn into_mismatch(self) -> Option<CoreError> {
        if self.matches {
            return None;
        }
        Some(CoreError::ChecksumMismatch {
            location: self.location,
            stored: self.stored,
            computed: self.computed,
        })
    }
}

pub fn compute(buffer: &[u8], spec: &ChecksumSpec) -> Result<(u32, u16), CoreError> {
    match spec.width {
        ChecksumWidth::Complement8 => {
            let (sum, checksum) = gen1::compute_ranges(buffer, spec.absolute_ranges())?;
            Ok((sum, u16::from(checksum)))
        }
        ChecksumWidth::Sum16 => gen2::compute_ranges(buffer, spec.absolute_ranges()),
    }
}

pub fn read_stored(buffer: &[u8], spec: &ChecksumSpec) -> Result<u16, CoreError> {
    let bytes = LeBytes::new(buffer);
    match spec.width {
        ChecksumWidth::Complement8 => bytes.read_u8(spec.location()).map(u16::from),
        ChecksumWidth::Sum16 => bytes.read_u16(spec.location()),
    }
}

pub fn validate(buffer: &[u8], spec: &ChecksumSpec) -> Result<ChecksumResult, CoreError> {
    let (sum, computed) = compute(buffer, spec)?;
    let stored = read_stored(buffer, spec)?;
    Ok(ChecksumResult {
        width: spec.width,
        location: spec.location(),
        sum,
        computed,
        stored,
        matches: computed == stored,
    })
}

/// Writes a freshly computed checksum and returns the post-write result.
///
/// All reads happen before the write, so an out-of-range spec fails without
/// modifying the buffer.
pub fn recompute(buffer: &mut [u8], spec: &ChecksumSpec) -> Result<ChecksumResult, CoreError> {
    let result = validate(buffer, spec)?;
    write_stored(buffer, spec, result.computed)?;
    Ok(ChecksumResult {
        stored: result.computed,
        matches: true,
        ..result
    })
}

pub(crate) fn write_stored(
    buffer: &mut [u8],
    spec: &ChecksumSpec,
    value: u16,
) -> Result<(), CoreError> {
    let mut bytes = LeBytes::new(buffer);
    match spec.width {
        ChecksumWidth::Complement8 => bytes.write_u8(spec.location(), value as u8),
        ChecksumWidth::Sum16 => bytes.write_u16(spec.location(), value),
    }
}
