use byteorder::{ByteOrder, LittleEndian};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::bytes::{LeBytes, ensure_len};
use crate::error::CoreError;

pub const BLOCK_A_BASE: usize = 0x0000;
pub const BLOCK_B_BASE: usize = 0xE000;
pub const SECTION_SLOT_SIZE: usize = 0x1000;
pub const SECTION_COUNT: usize = 14;
pub const BLOCK_SIZE: usize = SECTION_SLOT_SIZE * SECTION_COUNT;

pub const SECTION_ID_OFFSET: usize = 0x0FF4;
pub const SECTION_CHECKSUM_OFFSET: usize = 0x0FF6;
pub const SECTION_SAVE_INDEX_OFFSET: usize = 0x0FFC;

/// Checksummed data length of each section, indexed by section ID.
pub const SECTION_DATA_SIZES: [usize; SECTION_COUNT] = [
    3884, // trainer info
    3968, // team / items
    3968, // game state
    3968, // misc
    3848, // rival
    3968, 3968, 3968, 3968, 3968, 3968, 3968, 3968, // PC buffers A-H
    2000, // PC buffer I
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockId {
    A,
    B,
}

impl BlockId {
    pub fn base_address(self) -> usize {
        match self {
            Self::A => BLOCK_A_BASE,
            Self::B => BLOCK_B_BASE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Physical slot (0..14) inside the block; unrelated to `section_id`.
    pub slot: usize,
    pub section_id: u16,
    pub save_index: u32,
    /// Zero when `section_id` is out of range.
    pub data_size: usize,
    pub base_address: usize,
    pub stored_checksum: u16,
    /// `None` when `section_id` is out of range and no size is known.
    pub computed_checksum: Option<u16>,
    pub checksum_offset: usize,
}

impl SectionDescriptor {
    pub fn matches(&self) -> bool {
        self.computed_checksum == Some(self.stored_checksum)
    }
}

/// One redundant copy of the save: 14 sections stored in arbitrary order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveBlock {
    pub base_address: usize,
    pub save_index: u32,
    pub sections: Vec<SectionDescriptor>,
    /// Why the section table is unusable, if it is.
    pub table_error: Option<String>,
}

impl SaveBlock {
    /// Section IDs are a permutation of 0..14 and all sections agree on the save index.
    pub fn is_structurally_valid(&self) -> bool {
        self.table_error.is_none()
    }

    /// Structurally valid and every section checksum matches.
    pub fn is_valid(&self) -> bool {
        self.is_structurally_valid() && self.sections.iter().all(SectionDescriptor::matches)
    }

    pub fn validate_structure(&self) -> Result<(), CoreError> {
        match &self.table_error {
            None => Ok(()),
            Some(reason) => Err(CoreError::MalformedSectionTable {
                block_base: self.base_address,
                reason: reason.clone(),
            }),
        }
    }

    pub fn section(&self, section_id: u16) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.section_id == section_id)
    }

    /// Base address of the section with `section_id`.
    ///
    /// Sections rotate between saves, so the slot position says nothing
    /// about which section lives there.
    pub fn find_section(&self, section_id: u16) -> Option<usize> {
        self.section(section_id).map(|s| s.base_address)
    }

    pub fn section_containing(&self, address: usize) -> Option<&SectionDescriptor> {
        self.sections
            .iter()
            .find(|s| s.base_address <= address && address < s.base_address + SECTION_SLOT_SIZE)
    }
}

pub fn find_section(block: &SaveBlock, section_id: u16) -> Option<usize> {
    block.find_section(section_id)
}

pub fn section_data_size(section_id: u16) -> Option<usize> {
    SECTION_DATA_SIZES.get(usize::from(section_id)).copied()
}

/// Folds a 32-bit word sum to 16 bits. The carry out of the fold is dropped.
pub fn fold_checksum(sum: u32) -> u16 {
    ((sum >> 16) as u16).wrapping_add(sum as u16)
}

/// Sums `data_size` bytes at `base` as little-endian words and folds the result.
pub fn section_checksum(buffer: &[u8], base: usize, data_size: usize) -> Result<u16, CoreError> {
    if data_size % 4 != 0 {
        return Err(CoreError::invalid(format!(
            "section data size {data_size} is not a multiple of 4"
        )));
    }
    let bytes = LeBytes::new(buffer);
    let data = bytes.slice(base, data_size)?;
    let sum = data
        .chunks_exact(4)
        .fold(0u32, |acc, word| acc.wrapping_add(LittleEndian::read_u32(word)));
    Ok(fold_checksum(sum))
}

pub fn parse_block(buffer: &[u8], block_base: usize) -> Result<SaveBlock, CoreError> {
    ensure_len(buffer, block_base, BLOCK_SIZE)?;
    let bytes = LeBytes::new(buffer);

    let mut sections = Vec::with_capacity(SECTION_COUNT);
    for slot in 0..SECTION_COUNT {
        let base_address = block_base + slot * SECTION_SLOT_SIZE;
        let section_id = bytes.read_u16(base_address + SECTION_ID_OFFSET)?;
        let stored_checksum = bytes.read_u16(base_address + SECTION_CHECKSUM_OFFSET)?;
        let save_index = bytes.read_u32(base_address + SECTION_SAVE_INDEX_OFFSET)?;

        let (data_size, computed_checksum) = match section_data_size(section_id) {
            Some(size) => (size, Some(section_checksum(buffer, base_address, size)?)),
            None => {
                warn!("block {block_base:#07x} slot {slot}: invalid section id {section_id}");
                (0, None)
            }
        };

        sections.push(SectionDescriptor {
            slot,
            section_id,
            save_index,
            data_size,
            base_address,
            stored_checksum,
            computed_checksum,
            checksum_offset: base_address + SECTION_CHECKSUM_OFFSET,
        });
    }

    let table_error = check_section_table(&sections);
    let save_index = sections.last().map_or(0, |s| s.save_index);
    debug!(
        "parsed block {block_base:#07x}: save index {save_index}, table {}",
        table_error.as_deref().unwrap_or("ok")
    );

    Ok(SaveBlock {
        base_address: block_base,
        save_index,
        sections,
        table_error,
    })
}

fn check_section_table(sections: &[SectionDescriptor]) -> Option<String> {
    let mut seen = [false; SECTION_COUNT];
    for section in sections {
        let Some(flag) = seen.get_mut(usize::from(section.section_id)) else {
            return Some(format!(
                "slot {} holds out-of-range section id {}",
                section.slot, section.section_id
            ));
        };
        if *flag {
            return Some(format!("section id {} appears twice", section.section_id));
        }
        *flag = true;
    }
    if let Some(missing) = seen.iter().position(|present| !present) {
        return Some(format!("section id {missing} is missing"));
    }
    if let Some(first) = sections.first()
        && let Some(odd) = sections.iter().find(|s| s.save_index != first.save_index)
    {
        warn!(
            "slot {} save index {} disagrees with slot {} save index {}",
            odd.slot, odd.save_index, first.slot, first.save_index
        );
        return Some("sections disagree on the save index".to_string());
    }
    None
}

/// Whether `candidate` was written after `current`, treating the 32-bit
/// counter as wrapping: a forward distance under half the index space is newer.
pub fn is_newer_index(candidate: u32, current: u32) -> bool {
    let distance = candidate.wrapping_sub(current);
    distance != 0 && distance < 0x8000_0000
}

/// Picks the authoritative block among fully valid blocks.
///
/// With both valid, the newer save index wins (ties go to A). With one
/// valid, that one wins. With neither, the save is indeterminate.
pub fn determine_current_block(
    block_a: &SaveBlock,
    block_b: &SaveBlock,
) -> Result<BlockId, CoreError> {
    select(block_a, block_b, SaveBlock::is_valid)
}

/// Like [`determine_current_block`] but only requires structural validity,
/// for best-effort read-only inspection of a save with bad checksums.
pub fn determine_readable_block(
    block_a: &SaveBlock,
    block_b: &SaveBlock,
) -> Result<BlockId, CoreError> {
    select(block_a, block_b, SaveBlock::is_structurally_valid)
}

fn select(
    block_a: &SaveBlock,
    block_b: &SaveBlock,
    usable: fn(&SaveBlock) -> bool,
) -> Result<BlockId, CoreError> {
    let b_newer = is_newer_index(block_b.save_index, block_a.save_index);
    let chosen = match (usable(block_a), usable(block_b)) {
        (true, true) => {
            if b_newer {
                BlockId::B
            } else {
                BlockId::A
            }
        }
        (true, false) => {
            if b_newer {
                warn!("block B is newer but unusable; falling back to block A");
            }
            BlockId::A
        }
        (false, true) => {
            if !b_newer {
                warn!("block A is newer but unusable; falling back to block B");
            }
            BlockId::B
        }
        (false, false) => return Err(CoreError::IndeterminateSaveBlock),
    };
    debug!(
        "current block {chosen:?} (A index {}, B index {})",
        block_a.save_index, block_b.save_index
    );
    Ok(chosen)
}

/// Rewrites every section checksum of the block at `block_base`.
///
/// Refuses to write anything when the block's section table is malformed.
pub fn recompute_block(buffer: &mut [u8], block_base: usize) -> Result<SaveBlock, CoreError> {
    let block = parse_block(buffer, block_base)?;
    block.validate_structure()?;
    let mut bytes = LeBytes::new(&mut *buffer);
    for section in &block.sections {
        if let Some(checksum) = section.computed_checksum {
            bytes.write_u16(section.checksum_offset, checksum)?;
        }
    }
    parse_block(buffer, block_base)
}

/// Recomputes and writes the checksum of one section of a structurally valid block.
pub fn recompute_section(
    buffer: &mut [u8],
    block: &SaveBlock,
    section_id: u16,
) -> Result<u16, CoreError> {
    block.validate_structure()?;
    let section = block.section(section_id).ok_or_else(|| {
        CoreError::invalid(format!("section id {section_id} not present in block"))
    })?;
    let checksum = section_checksum(buffer, section.base_address, section.data_size)?;
    LeBytes::new(buffer).write_u16(section.checksum_offset, checksum)?;
    Ok(checksum)
}
