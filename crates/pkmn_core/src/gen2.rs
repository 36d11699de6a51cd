//! Generation 2 (Gold/Silver, Crystal) checksums.
//!
//! Both checksums are the low 16 bits of a byte-wise sum, stored
//! little-endian. They cover different regions and are validated and
//! written independently.

use crate::bytes::LeBytes;
use crate::checksum::{self, ChecksumResult};
use crate::error::CoreError;
use crate::game::GameVariant;
use crate::layout::{ByteRange, ChecksumSpec, ChecksumWidth};

pub const MIN_SAVE_SIZE: usize = 0x8000;

const fn sum16(ranges: &'static [ByteRange], stored_at: usize) -> ChecksumSpec {
    ChecksumSpec::new(ChecksumWidth::Sum16, 0, ranges, stored_at)
}

const GS_INTL_FIRST: &[ByteRange] = &[ByteRange::inclusive(0x2009, 0x2D68)];
const GS_INTL_SECOND: &[ByteRange] = &[
    ByteRange::inclusive(0x0C6B, 0x17EC),
    ByteRange::inclusive(0x3D96, 0x3F3F),
    ByteRange::inclusive(0x7E39, 0x7E6C),
];
const GS_JP_FIRST: &[ByteRange] = &[ByteRange::inclusive(0x2009, 0x2C8B)];
const GS_JP_SECOND: &[ByteRange] = &[ByteRange::inclusive(0x7209, 0x7E8B)];
const CRYSTAL_INTL_FIRST: &[ByteRange] = &[ByteRange::inclusive(0x2009, 0x2B82)];
const CRYSTAL_INTL_SECOND: &[ByteRange] = &[ByteRange::inclusive(0x1209, 0x1D82)];
const CRYSTAL_JP_FIRST: &[ByteRange] = &[ByteRange::inclusive(0x2009, 0x2AE2)];
const CRYSTAL_JP_SECOND: &[ByteRange] = &[ByteRange::inclusive(0x7209, 0x7CE2)];

static GOLD_SILVER_INTERNATIONAL: [ChecksumSpec; 2] = [
    sum16(GS_INTL_FIRST, 0x2D69),
    sum16(GS_INTL_SECOND, 0x7E6D),
];

static GOLD_SILVER_JAPANESE: [ChecksumSpec; 2] =
    [sum16(GS_JP_FIRST, 0x2D0D), sum16(GS_JP_SECOND, 0x7F0D)];

static CRYSTAL_INTERNATIONAL: [ChecksumSpec; 2] = [
    sum16(CRYSTAL_INTL_FIRST, 0x2D0D),
    sum16(CRYSTAL_INTL_SECOND, 0x1F0D),
];

static CRYSTAL_JAPANESE: [ChecksumSpec; 2] = [
    sum16(CRYSTAL_JP_FIRST, 0x2D0D),
    sum16(CRYSTAL_JP_SECOND, 0x7F0D),
];

/// The two checksum specs for a Generation 2 title, or `None` for other games.
pub fn checksum_specs(variant: GameVariant, japanese: bool) -> Option<&'static [ChecksumSpec; 2]> {
    match (variant, japanese) {
        (GameVariant::GoldSilver, false) => Some(&GOLD_SILVER_INTERNATIONAL),
        (GameVariant::GoldSilver, true) => Some(&GOLD_SILVER_JAPANESE),
        (GameVariant::Crystal, false) => Some(&CRYSTAL_INTERNATIONAL),
        (GameVariant::Crystal, true) => Some(&CRYSTAL_JAPANESE),
        _ => None,
    }
}

/// Sums every byte of every range (each byte added individually).
pub fn compute_ranges<I>(buffer: &[u8], ranges: I) -> Result<(u32, u16), CoreError>
where
    I: IntoIterator<Item = ByteRange>,
{
    let bytes = LeBytes::new(buffer);
    let mut sum = 0u32;
    for range in ranges {
        sum = bytes
            .slice(range.start, range.len())?
            .iter()
            .fold(sum, |acc, &b| acc.wrapping_add(u32::from(b)));
    }
    Ok((sum, sum as u16))
}

fn specs_for(
    variant: GameVariant,
    japanese: bool,
) -> Result<&'static [ChecksumSpec; 2], CoreError> {
    checksum_specs(variant, japanese).ok_or_else(|| {
        CoreError::unsupported(format!("{variant} does not use Generation 2 checksums"))
    })
}

pub fn validate_save(
    buffer: &[u8],
    variant: GameVariant,
    japanese: bool,
) -> Result<Vec<ChecksumResult>, CoreError> {
    specs_for(variant, japanese)?
        .iter()
        .map(|spec| checksum::validate(buffer, spec))
        .collect()
}

pub fn recompute_save(
    buffer: &mut [u8],
    variant: GameVariant,
    japanese: bool,
) -> Result<Vec<ChecksumResult>, CoreError> {
    let specs = specs_for(variant, japanese)?;
    // Every offset is read once before the first write.
    for spec in specs {
        checksum::validate(buffer, spec)?;
    }
    specs
        .iter()
        .map(|spec| checksum::recompute(buffer, spec))
        .collect()
}
