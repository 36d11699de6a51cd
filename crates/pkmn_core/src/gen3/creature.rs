use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::crypto::{
    self, CHECKSUM_OFFSET, DecryptedPayload, OTID_OFFSET, PAYLOAD_OFFSET, PID_OFFSET,
};
use super::sections::{BlockId, SaveBlock};
use crate::bytes::{LeBytes, ensure_len};
use crate::error::CoreError;
use crate::game::Gen3Variant;

pub const PARTY_CAPACITY: usize = 6;
pub const PARTY_RECORD_LEN: usize = 100;
pub const BOX_RECORD_LEN: usize = 80;
pub const BOX_COUNT: usize = 14;
pub const SLOTS_PER_BOX: usize = 30;

const PARTY_SECTION: u16 = 1;
const PC_FIRST_SECTION: u16 = 5;
const PC_LAST_SECTION: u16 = 13;
/// Section 5 opens with the current-box index before the records start.
const PC_HEADER_LEN: usize = 4;

pub fn team_size_offset(variant: Gen3Variant) -> usize {
    match variant {
        Gen3Variant::RubySapphire | Gen3Variant::Emerald => 0x0234,
        Gen3Variant::FireRedLeafGreen => 0x0034,
    }
}

/// Where a creature record lives, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureSlot {
    Party(usize),
    Box { box_index: usize, slot: usize },
}

impl fmt::Display for CreatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Party(index) => write!(f, "Party {}", index + 1),
            Self::Box { box_index, slot } => write!(f, "Box {} Slot {}", box_index + 1, slot + 1),
        }
    }
}

/// A physically contiguous piece of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub address: usize,
    pub len: usize,
}

/// Physical placement of one logical record, which may be split across
/// two sections when it straddles a PC-storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSpan {
    pub slot: CreatureSlot,
    pub len: usize,
    pub chunks: Vec<Chunk>,
}

impl RecordSpan {
    /// Physical address of logical byte `offset` within the record.
    pub fn address_of(&self, offset: usize) -> Option<usize> {
        let mut remaining = offset;
        for chunk in &self.chunks {
            if remaining < chunk.len {
                return Some(chunk.address + remaining);
            }
            remaining -= chunk.len;
        }
        None
    }

    pub fn read(&self, buffer: &[u8]) -> Result<Vec<u8>, CoreError> {
        let bytes = LeBytes::new(buffer);
        let mut record = Vec::with_capacity(self.len);
        for chunk in &self.chunks {
            record.extend_from_slice(bytes.slice(chunk.address, chunk.len)?);
        }
        Ok(record)
    }

    fn write(&self, buffer: &mut [u8], record: &[u8]) -> Result<(), CoreError> {
        if record.len() != self.len {
            return Err(CoreError::invalid(format!(
                "record is {} bytes, slot holds {}",
                record.len(),
                self.len
            )));
        }
        for chunk in &self.chunks {
            ensure_len(buffer, chunk.address, chunk.len)?;
        }
        let mut bytes = LeBytes::new(buffer);
        let mut cursor = 0;
        for chunk in &self.chunks {
            bytes.write_bytes(chunk.address, &record[cursor..cursor + chunk.len])?;
            cursor += chunk.len;
        }
        Ok(())
    }

    /// IDs of the sections this record touches, in chunk order.
    pub fn section_ids(&self, block: &SaveBlock) -> Vec<u16> {
        let mut ids = Vec::with_capacity(self.chunks.len());
        for chunk in &self.chunks {
            if let Some(section) = block.section_containing(chunk.address)
                && !ids.contains(&section.section_id)
            {
                ids.push(section.section_id);
            }
        }
        ids
    }
}

/// PC storage as one logical byte stream over sections 5..=13 in ID order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcStorageMap {
    pieces: Vec<Chunk>,
}

impl PcStorageMap {
    pub fn new(block: &SaveBlock) -> Result<Self, CoreError> {
        block.validate_structure()?;
        let mut pieces = Vec::new();
        for section_id in PC_FIRST_SECTION..=PC_LAST_SECTION {
            let section = block
                .section(section_id)
                .ok_or_else(|| missing_section(section_id))?;
            let skip = if section_id == PC_FIRST_SECTION {
                PC_HEADER_LEN
            } else {
                0
            };
            pieces.push(Chunk {
                address: section.base_address + skip,
                len: section.data_size - skip,
            });
        }
        Ok(Self { pieces })
    }

    pub fn len(&self) -> usize {
        self.pieces.iter().map(|p| p.len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Physical chunks covering `len` logical bytes starting at `offset`.
    pub fn chunks(&self, offset: usize, len: usize) -> Result<Vec<Chunk>, CoreError> {
        let mut out = Vec::new();
        let mut skip = offset;
        let mut wanted = len;
        for piece in &self.pieces {
            if wanted == 0 {
                break;
            }
            if skip >= piece.len {
                skip -= piece.len;
                continue;
            }
            let take = (piece.len - skip).min(wanted);
            out.push(Chunk {
                address: piece.address + skip,
                len: take,
            });
            wanted -= take;
            skip = 0;
        }
        if wanted != 0 {
            return Err(CoreError::BufferTooShort {
                offset,
                len,
                buffer_len: self.len(),
            });
        }
        Ok(out)
    }

    pub fn record(&self, box_index: usize, slot: usize) -> Result<RecordSpan, CoreError> {
        if box_index >= BOX_COUNT || slot >= SLOTS_PER_BOX {
            return Err(CoreError::invalid(format!(
                "box {} slot {} out of range ({BOX_COUNT} boxes of {SLOTS_PER_BOX})",
                box_index + 1,
                slot + 1
            )));
        }
        let offset = (box_index * SLOTS_PER_BOX + slot) * BOX_RECORD_LEN;
        Ok(RecordSpan {
            slot: CreatureSlot::Box { box_index, slot },
            len: BOX_RECORD_LEN,
            chunks: self.chunks(offset, BOX_RECORD_LEN)?,
        })
    }
}

fn missing_section(section_id: u16) -> CoreError {
    CoreError::invalid(format!("section id {section_id} not present in block"))
}

/// Number of party members, or 0 when the stored count is implausible.
pub fn team_size(
    buffer: &[u8],
    block: &SaveBlock,
    variant: Gen3Variant,
) -> Result<usize, CoreError> {
    block.validate_structure()?;
    let section1 = block
        .find_section(PARTY_SECTION)
        .ok_or_else(|| missing_section(PARTY_SECTION))?;
    let stored = LeBytes::new(buffer).read_u32(section1 + team_size_offset(variant))?;
    match usize::try_from(stored) {
        Ok(count) if count <= PARTY_CAPACITY => Ok(count),
        _ => {
            warn!(
                "block {:#07x}: team size {stored} exceeds {PARTY_CAPACITY}; treating as empty",
                block.base_address
            );
            Ok(0)
        }
    }
}

pub fn party_spans(
    buffer: &[u8],
    block: &SaveBlock,
    variant: Gen3Variant,
) -> Result<Vec<RecordSpan>, CoreError> {
    let count = team_size(buffer, block, variant)?;
    let section1 = block
        .find_section(PARTY_SECTION)
        .ok_or_else(|| missing_section(PARTY_SECTION))?;
    let first = section1 + team_size_offset(variant) + 4;
    Ok((0..count)
        .map(|index| RecordSpan {
            slot: CreatureSlot::Party(index),
            len: PARTY_RECORD_LEN,
            chunks: vec![Chunk {
                address: first + index * PARTY_RECORD_LEN,
                len: PARTY_RECORD_LEN,
            }],
        })
        .collect())
}

pub fn box_spans(block: &SaveBlock) -> Result<Vec<RecordSpan>, CoreError> {
    let map = PcStorageMap::new(block)?;
    let mut spans = Vec::with_capacity(BOX_COUNT * SLOTS_PER_BOX);
    for box_index in 0..BOX_COUNT {
        for slot in 0..SLOTS_PER_BOX {
            spans.push(map.record(box_index, slot)?);
        }
    }
    Ok(spans)
}

/// Resolves one slot to its physical span. Party slots beyond the team size are rejected.
pub fn locate(
    buffer: &[u8],
    block: &SaveBlock,
    variant: Gen3Variant,
    slot: CreatureSlot,
) -> Result<RecordSpan, CoreError> {
    match slot {
        CreatureSlot::Party(index) => party_spans(buffer, block, variant)?
            .into_iter()
            .nth(index)
            .ok_or_else(|| CoreError::invalid(format!("party slot {} is empty", index + 1))),
        CreatureSlot::Box {
            box_index,
            slot: index,
        } => PcStorageMap::new(block)?.record(box_index, index),
    }
}

/// A record opened for editing. Edits touch plaintext only; nothing reaches
/// the buffer until [`DecryptedCreature::commit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedCreature {
    span: RecordSpan,
    pid: u32,
    otid: u32,
    stored_checksum: u16,
    payload: DecryptedPayload,
}

impl DecryptedCreature {
    pub fn open(buffer: &[u8], span: RecordSpan) -> Result<Self, CoreError> {
        let record = span.read(buffer)?;
        let bytes = LeBytes::new(&record[..]);
        let key = crypto::creature_decryption_key(&record, 0)?;
        Ok(Self {
            pid: bytes.read_u32(PID_OFFSET)?,
            otid: bytes.read_u32(OTID_OFFSET)?,
            stored_checksum: crypto::stored_creature_checksum(&record, 0)?,
            payload: crypto::decrypt_creature_data(&record, 0, key)?,
            span,
        })
    }

    pub fn slot(&self) -> CreatureSlot {
        self.span.slot
    }

    pub fn span(&self) -> &RecordSpan {
        &self.span
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn otid(&self) -> u32 {
        self.otid
    }

    pub fn set_pid(&mut self, pid: u32) {
        self.pid = pid;
    }

    pub fn set_otid(&mut self, otid: u32) {
        self.otid = otid;
    }

    pub fn stored_checksum(&self) -> u16 {
        self.stored_checksum
    }

    pub fn computed_checksum(&self) -> u16 {
        self.payload.checksum()
    }

    pub fn checksum_valid(&self) -> bool {
        self.stored_checksum == self.computed_checksum()
    }

    pub fn payload(&self) -> &DecryptedPayload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut DecryptedPayload {
        &mut self.payload
    }

    /// Writes PID/OTID, a checksum over the current plaintext, and the
    /// re-encrypted payload. The key comes from the PID/OTID being written.
    ///
    /// The containing section checksums are left stale; callers recompute
    /// them (see [`RecordSpan::section_ids`]).
    pub fn commit(self, buffer: &mut [u8]) -> Result<u16, CoreError> {
        let mut record = self.span.read(buffer)?;
        let mut bytes = LeBytes::new(&mut record[..]);
        bytes.write_u32(PID_OFFSET, self.pid)?;
        bytes.write_u32(OTID_OFFSET, self.otid)?;

        let key = crypto::creature_decryption_key(&record, 0)?;
        let checksum = crypto::creature_checksum(&self.payload);
        let ciphertext = crypto::encrypt_creature_data(&self.payload, key);

        let mut bytes = LeBytes::new(&mut record[..]);
        bytes.write_u16(CHECKSUM_OFFSET, checksum)?;
        bytes.write_bytes(PAYLOAD_OFFSET, ciphertext.as_bytes())?;
        self.span.write(buffer, &record)?;

        debug!("committed {} with checksum {checksum:#06x}", self.span.slot);
        Ok(checksum)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureChecksumEntry {
    pub block: BlockId,
    pub slot: CreatureSlot,
    pub label: String,
    pub pid: u32,
    pub checksum_address: usize,
    pub stored: u16,
    pub computed: u16,
    pub valid: bool,
}

/// Checks every party member and every occupied PC slot of one block.
pub fn audit_block(
    buffer: &[u8],
    block: &SaveBlock,
    block_id: BlockId,
    variant: Gen3Variant,
) -> Result<Vec<CreatureChecksumEntry>, CoreError> {
    let mut entries = Vec::new();
    let party = party_spans(buffer, block, variant)?;
    let boxes = box_spans(block)?;
    for span in party.into_iter().chain(boxes) {
        let creature = DecryptedCreature::open(buffer, span)?;
        if matches!(creature.slot(), CreatureSlot::Box { .. }) && creature.pid() == 0 {
            continue;
        }
        let checksum_address = creature
            .span()
            .address_of(CHECKSUM_OFFSET)
            .ok_or_else(|| CoreError::invalid("record too short for a checksum"))?;
        entries.push(CreatureChecksumEntry {
            block: block_id,
            slot: creature.slot(),
            label: creature.slot().to_string(),
            pid: creature.pid(),
            checksum_address,
            stored: creature.stored_checksum(),
            computed: creature.computed_checksum(),
            valid: creature.checksum_valid(),
        });
    }
    Ok(entries)
}
