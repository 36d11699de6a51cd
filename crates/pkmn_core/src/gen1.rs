//! Generation 1 (Red/Blue/Yellow/Green) bank checksums.
//!
//! Each checksum is the bitwise complement of the low byte of a plain byte
//! sum. A save carries one main bank and two PC box banks; every box bank has
//! a whole-bank checksum plus one checksum per box it holds.

use serde::{Deserialize, Serialize};

use crate::bytes::LeBytes;
use crate::checksum::{self, ChecksumResult};
use crate::error::CoreError;
use crate::layout::{ByteRange, ChecksumSpec, ChecksumWidth};

pub const MIN_SAVE_SIZE: usize = 0x7A53;
pub const NOMINAL_SAVE_SIZE: usize = 0x8000;

pub const BOX_BANK_BASES: [usize; 2] = [0x4000, 0x6000];
const BOX_MAIN_STORED_AT: usize = 0x1A4C;
const BOX_SUB_STORED_AT: usize = 0x1A4D;
const ERASED_BYTE: u8 = 0xFF;

const MAIN_INTERNATIONAL: &[ByteRange] = &[ByteRange::inclusive(0x2598, 0x3522)];
const MAIN_JAPANESE: &[ByteRange] = &[ByteRange::inclusive(0x2598, 0x3593)];

const BOX_MAIN: &[ByteRange] = &[ByteRange::inclusive(0x0000, 0x1A4B)];
const BOX_SUBS: [&[ByteRange]; 6] = [
    &[ByteRange::inclusive(0x0000, 0x0461)],
    &[ByteRange::inclusive(0x0462, 0x08C3)],
    &[ByteRange::inclusive(0x08C4, 0x0D25)],
    &[ByteRange::inclusive(0x0D26, 0x1187)],
    &[ByteRange::inclusive(0x1188, 0x15E9)],
    &[ByteRange::inclusive(0x15EA, 0x1A4B)],
];

/// A named group of checksums that are validated and rewritten together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSpec {
    pub name: &'static str,
    pub checks: &'static [ChecksumSpec],
    /// When every byte here is 0xFF the bank was never written and counts as valid.
    pub erased_range: Option<ByteRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankResult {
    pub name: String,
    pub erased: bool,
    pub checks: Vec<ChecksumResult>,
}

impl BankResult {
    pub fn matches(&self) -> bool {
        self.checks.iter().all(|c| c.matches)
    }
}

const fn complement(base: usize, ranges: &'static [ByteRange], stored_at: usize) -> ChecksumSpec {
    ChecksumSpec::new(ChecksumWidth::Complement8, base, ranges, stored_at)
}

const fn box_bank_checks(base: usize) -> [ChecksumSpec; 7] {
    [
        complement(base, BOX_MAIN, BOX_MAIN_STORED_AT),
        complement(base, BOX_SUBS[0], BOX_SUB_STORED_AT),
        complement(base, BOX_SUBS[1], BOX_SUB_STORED_AT + 1),
        complement(base, BOX_SUBS[2], BOX_SUB_STORED_AT + 2),
        complement(base, BOX_SUBS[3], BOX_SUB_STORED_AT + 3),
        complement(base, BOX_SUBS[4], BOX_SUB_STORED_AT + 4),
        complement(base, BOX_SUBS[5], BOX_SUB_STORED_AT + 5),
    ]
}

static MAIN_INTERNATIONAL_CHECKS: [ChecksumSpec; 1] = [complement(0, MAIN_INTERNATIONAL, 0x3523)];
static MAIN_JAPANESE_CHECKS: [ChecksumSpec; 1] = [complement(0, MAIN_JAPANESE, 0x3594)];
static BANK_2_CHECKS: [ChecksumSpec; 7] = box_bank_checks(BOX_BANK_BASES[0]);
static BANK_3_CHECKS: [ChecksumSpec; 7] = box_bank_checks(BOX_BANK_BASES[1]);

pub static MAIN_BANK_INTERNATIONAL: BankSpec = BankSpec {
    name: "Bank 1",
    checks: &MAIN_INTERNATIONAL_CHECKS,
    erased_range: None,
};

pub static MAIN_BANK_JAPANESE: BankSpec = BankSpec {
    name: "Bank 1",
    checks: &MAIN_JAPANESE_CHECKS,
    erased_range: None,
};

pub static BOX_BANK_2: BankSpec = BankSpec {
    name: "Bank 2",
    checks: &BANK_2_CHECKS,
    erased_range: Some(BOX_MAIN[0].rebased(BOX_BANK_BASES[0])),
};

pub static BOX_BANK_3: BankSpec = BankSpec {
    name: "Bank 3",
    checks: &BANK_3_CHECKS,
    erased_range: Some(BOX_MAIN[0].rebased(BOX_BANK_BASES[1])),
};

pub fn banks(japanese: bool) -> [&'static BankSpec; 3] {
    let main = if japanese {
        &MAIN_BANK_JAPANESE
    } else {
        &MAIN_BANK_INTERNATIONAL
    };
    [main, &BOX_BANK_2, &BOX_BANK_3]
}

pub fn complement_checksum(sum: u32) -> u8 {
    !(sum as u8)
}

/// Sums every byte of `range` and derives the 8-bit checksum.
pub fn compute_bank(buffer: &[u8], range: ByteRange) -> Result<(u32, u8), CoreError> {
    compute_ranges(buffer, [range])
}

pub fn compute_ranges<I>(buffer: &[u8], ranges: I) -> Result<(u32, u8), CoreError>
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
    Ok((sum, complement_checksum(sum)))
}

/// Compares the checksum of `range` against the byte stored at `stored_at`.
pub fn validate_bank(
    buffer: &[u8],
    range: ByteRange,
    stored_at: usize,
) -> Result<ChecksumResult, CoreError> {
    let (sum, computed) = compute_bank(buffer, range)?;
    let stored = LeBytes::new(buffer).read_u8(stored_at)?;
    Ok(ChecksumResult {
        width: ChecksumWidth::Complement8,
        location: stored_at,
        sum,
        computed: u16::from(computed),
        stored: u16::from(stored),
        matches: computed == stored,
    })
}

fn is_erased(buffer: &[u8], bank: &BankSpec) -> Result<bool, CoreError> {
    let Some(range) = bank.erased_range else {
        return Ok(false);
    };
    let bytes = LeBytes::new(buffer);
    let region = bytes.slice(range.start, range.len())?;
    Ok(region.iter().all(|&b| b == ERASED_BYTE))
}

pub fn validate(buffer: &[u8], bank: &BankSpec) -> Result<BankResult, CoreError> {
    let erased = is_erased(buffer, bank)?;
    let mut checks = Vec::with_capacity(bank.checks.len());
    for spec in bank.checks {
        let mut result = checksum::validate(buffer, spec)?;
        if erased {
            result.matches = true;
        }
        checks.push(result);
    }
    Ok(BankResult {
        name: bank.name.to_string(),
        erased,
        checks,
    })
}

/// Rewrites every checksum of the bank. Erased banks are left untouched.
pub fn recompute(buffer: &mut [u8], bank: &BankSpec) -> Result<BankResult, CoreError> {
    let before = validate(buffer, bank)?;
    if before.erased {
        return Ok(before);
    }
    let mut checks = Vec::with_capacity(bank.checks.len());
    for spec in bank.checks {
        checks.push(checksum::recompute(buffer, spec)?);
    }
    Ok(BankResult {
        name: before.name,
        erased: false,
        checks,
    })
}

pub fn validate_save(buffer: &[u8], japanese: bool) -> Result<Vec<BankResult>, CoreError> {
    banks(japanese)
        .into_iter()
        .map(|bank| validate(buffer, bank))
        .collect()
}

pub fn recompute_save(buffer: &mut [u8], japanese: bool) -> Result<Vec<BankResult>, CoreError> {
    // Every offset is read once before the first write.
    validate_save(buffer, japanese)?;
    banks(japanese)
        .into_iter()
        .map(|bank| recompute(buffer, bank))
        .collect()
}
