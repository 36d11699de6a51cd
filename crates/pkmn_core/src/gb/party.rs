//! Game Boy party records.
//!
//! The party block is a count byte, a seven-entry species list ending in
//! 0xFF, six fixed-size records and then the trainer and nickname tables.
//! Record fields are big-endian.

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::bytes::{LeBytes, ensure_len};
use crate::error::CoreError;
use crate::game::{Game, GameVariant};

use super::recompute_checksums;

pub const PARTY_CAPACITY: usize = 6;
const SPECIES_LIST_LEN: usize = PARTY_CAPACITY + 1;
const RECORDS_OFFSET: usize = 1 + SPECIES_LIST_LEN;
const LIST_TERMINATOR: u8 = 0xFF;
const MAX_EXPERIENCE: u32 = 0x00FF_FFFF;

/// Byte offsets of the fields inside one record.
#[derive(Debug, PartialEq, Eq)]
struct RecordFields {
    species: usize,
    held_item: Option<usize>,
    /// Gen1 keeps a second level byte used by the PC boxes.
    level_copy: Option<usize>,
    current_hp: usize,
    status: usize,
    moves: usize,
    trainer_id: usize,
    experience: usize,
    dvs: usize,
    pp: usize,
    friendship: Option<usize>,
    level: usize,
    max_hp: usize,
}

static GEN1_FIELDS: RecordFields = RecordFields {
    species: 0x00,
    held_item: None,
    level_copy: Some(0x03),
    current_hp: 0x01,
    status: 0x04,
    moves: 0x08,
    trainer_id: 0x0C,
    experience: 0x0E,
    dvs: 0x1B,
    pp: 0x1D,
    friendship: None,
    level: 0x21,
    max_hp: 0x22,
};

static GEN2_FIELDS: RecordFields = RecordFields {
    species: 0x00,
    held_item: Some(0x01),
    level_copy: None,
    current_hp: 0x22,
    status: 0x20,
    moves: 0x02,
    trainer_id: 0x06,
    experience: 0x08,
    dvs: 0x15,
    pp: 0x17,
    friendship: Some(0x1B),
    level: 0x1F,
    max_hp: 0x24,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyLayout {
    pub base: usize,
    /// Gen2 second copy.
    pub mirror: Option<usize>,
    pub record_len: usize,
    fields: &'static RecordFields,
}

impl PartyLayout {
    const fn gen1(base: usize) -> Self {
        Self {
            base,
            mirror: None,
            record_len: 0x2C,
            fields: &GEN1_FIELDS,
        }
    }

    const fn gen2(base: usize, mirror: usize) -> Self {
        Self {
            base,
            mirror: Some(mirror),
            record_len: 0x30,
            fields: &GEN2_FIELDS,
        }
    }

    fn record_address(&self, copy_base: usize, index: usize) -> usize {
        copy_base + RECORDS_OFFSET + index * self.record_len
    }

    fn copies(&self) -> impl Iterator<Item = usize> {
        std::iter::once(self.base).chain(self.mirror)
    }
}

pub fn party_layout(game: Game) -> Result<PartyLayout, CoreError> {
    let layout = match (game.variant, game.japanese) {
        (GameVariant::RedBlue, false) => PartyLayout::gen1(0x2F2C),
        (GameVariant::RedBlue, true) => PartyLayout::gen1(0x2ED5),
        (GameVariant::GoldSilver, false) => PartyLayout::gen2(0x288A, 0x10E8),
        (GameVariant::GoldSilver, true) => PartyLayout::gen2(0x283E, 0x7A3E),
        (GameVariant::Crystal, false) => PartyLayout::gen2(0x2865, 0x1A65),
        (GameVariant::Crystal, true) => PartyLayout::gen2(0x281A, 0x7A1A),
        _ => {
            return Err(CoreError::unsupported(format!(
                "{game} has no Game Boy party layout"
            )));
        }
    };
    Ok(layout)
}

/// Party size from the count byte, clamped to six.
pub fn party_count(buffer: &[u8], layout: &PartyLayout) -> Result<usize, CoreError> {
    let count = usize::from(LeBytes::new(buffer).read_u8(layout.base)?);
    if count > PARTY_CAPACITY {
        warn!("party count {count} exceeds {PARTY_CAPACITY}; reading {PARTY_CAPACITY}");
        return Ok(PARTY_CAPACITY);
    }
    Ok(count)
}

/// Read-only view of one party member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyMember {
    pub slot: usize,
    pub species: u8,
    pub level: u8,
    pub held_item: Option<u8>,
    pub current_hp: u16,
    pub max_hp: u16,
    pub experience: u32,
    pub moves: [u8; 4],
    pub trainer_id: u16,
}

pub fn read_party(buffer: &[u8], game: Game) -> Result<Vec<PartyMember>, CoreError> {
    let layout = party_layout(game)?;
    (0..party_count(buffer, &layout)?)
        .map(|slot| PartyRecord::open_with(buffer, layout, slot).map(|r| r.summary()))
        .collect()
}

/// One party record copied out of the save for editing.
///
/// Setters change only the copy; [`PartyRecord::commit`] writes it back to
/// every party copy along with the species list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyRecord {
    slot: usize,
    layout: PartyLayout,
    record: Vec<u8>,
}

impl PartyRecord {
    pub fn open(buffer: &[u8], game: Game, slot: usize) -> Result<Self, CoreError> {
        Self::open_with(buffer, party_layout(game)?, slot)
    }

    fn open_with(buffer: &[u8], layout: PartyLayout, slot: usize) -> Result<Self, CoreError> {
        let count = party_count(buffer, &layout)?;
        if slot >= count {
            return Err(CoreError::invalid(format!(
                "party slot {slot} is empty (party holds {count})"
            )));
        }
        let bytes = LeBytes::new(buffer);
        let address = layout.record_address(layout.base, slot);
        Ok(Self {
            slot,
            layout,
            record: bytes.slice(address, layout.record_len)?.to_vec(),
        })
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    fn fields(&self) -> &'static RecordFields {
        self.layout.fields
    }

    pub fn species(&self) -> u8 {
        self.record[self.fields().species]
    }

    pub fn level(&self) -> u8 {
        self.record[self.fields().level]
    }

    pub fn held_item(&self) -> Option<u8> {
        self.fields().held_item.map(|at| self.record[at])
    }

    pub fn friendship(&self) -> Option<u8> {
        self.fields().friendship.map(|at| self.record[at])
    }

    pub fn status(&self) -> u8 {
        self.record[self.fields().status]
    }

    pub fn current_hp(&self) -> u16 {
        self.read_u16(self.fields().current_hp)
    }

    pub fn max_hp(&self) -> u16 {
        self.read_u16(self.fields().max_hp)
    }

    pub fn trainer_id(&self) -> u16 {
        self.read_u16(self.fields().trainer_id)
    }

    pub fn dvs(&self) -> u16 {
        self.read_u16(self.fields().dvs)
    }

    pub fn experience(&self) -> u32 {
        let at = self.fields().experience;
        BigEndian::read_u24(&self.record[at..at + 3])
    }

    pub fn moves(&self) -> [u8; 4] {
        self.read_quad(self.fields().moves)
    }

    pub fn pp(&self) -> [u8; 4] {
        self.read_quad(self.fields().pp)
    }

    /// Species 0 and 0xFF would end the species list early.
    pub fn set_species(&mut self, species: u8) -> Result<(), CoreError> {
        if species == 0 || species == LIST_TERMINATOR {
            return Err(CoreError::invalid(format!(
                "species {species:#04x} is not a valid party member"
            )));
        }
        let at = self.fields().species;
        self.record[at] = species;
        Ok(())
    }

    pub fn set_level(&mut self, level: u8) {
        let fields = self.fields();
        self.record[fields.level] = level;
        if let Some(at) = fields.level_copy {
            self.record[at] = level;
        }
    }

    pub fn set_held_item(&mut self, item_id: u8) -> Result<(), CoreError> {
        let at = self
            .fields()
            .held_item
            .ok_or_else(|| CoreError::unsupported("Generation 1 records hold no item"))?;
        self.record[at] = item_id;
        Ok(())
    }

    pub fn set_friendship(&mut self, friendship: u8) -> Result<(), CoreError> {
        let at = self
            .fields()
            .friendship
            .ok_or_else(|| CoreError::unsupported("Generation 1 records have no friendship"))?;
        self.record[at] = friendship;
        Ok(())
    }

    pub fn set_status(&mut self, status: u8) {
        let at = self.fields().status;
        self.record[at] = status;
    }

    pub fn set_current_hp(&mut self, hp: u16) {
        self.write_u16(self.fields().current_hp, hp);
    }

    pub fn set_max_hp(&mut self, hp: u16) {
        self.write_u16(self.fields().max_hp, hp);
    }

    pub fn set_trainer_id(&mut self, trainer_id: u16) {
        self.write_u16(self.fields().trainer_id, trainer_id);
    }

    pub fn set_dvs(&mut self, dvs: u16) {
        self.write_u16(self.fields().dvs, dvs);
    }

    /// Experience is stored in three bytes.
    pub fn set_experience(&mut self, experience: u32) -> Result<(), CoreError> {
        if experience > MAX_EXPERIENCE {
            return Err(CoreError::invalid(format!(
                "experience {experience} exceeds {MAX_EXPERIENCE}"
            )));
        }
        let at = self.fields().experience;
        BigEndian::write_u24(&mut self.record[at..at + 3], experience);
        Ok(())
    }

    pub fn set_moves(&mut self, moves: [u8; 4]) {
        let at = self.fields().moves;
        self.record[at..at + 4].copy_from_slice(&moves);
    }

    pub fn set_pp(&mut self, pp: [u8; 4]) {
        let at = self.fields().pp;
        self.record[at..at + 4].copy_from_slice(&pp);
    }

    pub fn summary(&self) -> PartyMember {
        PartyMember {
            slot: self.slot,
            species: self.species(),
            level: self.level(),
            held_item: self.held_item(),
            current_hp: self.current_hp(),
            max_hp: self.max_hp(),
            experience: self.experience(),
            moves: self.moves(),
            trainer_id: self.trainer_id(),
        }
    }

    /// Writes the record and its species list entry into every party copy,
    /// then recomputes checksums.
    pub fn commit(self, buffer: &mut [u8], game: Game) -> Result<(), CoreError> {
        if party_layout(game)? != self.layout {
            return Err(CoreError::invalid(format!(
                "party slot {} was opened from another game's layout",
                self.slot
            )));
        }
        for base in self.layout.copies() {
            ensure_len(buffer, base, 1 + SPECIES_LIST_LEN)?;
            ensure_len(
                buffer,
                self.layout.record_address(base, self.slot),
                self.layout.record_len,
            )?;
        }

        let species = self.species();
        let mut bytes = LeBytes::new(&mut *buffer);
        for base in self.layout.copies() {
            bytes.write_u8(base + 1 + self.slot, species)?;
            bytes.write_bytes(self.layout.record_address(base, self.slot), &self.record)?;
        }
        recompute_checksums(buffer, game)?;
        debug!(
            "party slot {} = species {species:#04x} level {} in {game}",
            self.slot,
            self.level()
        );
        Ok(())
    }

    fn read_u16(&self, at: usize) -> u16 {
        BigEndian::read_u16(&self.record[at..at + 2])
    }

    fn write_u16(&mut self, at: usize, value: u16) {
        BigEndian::write_u16(&mut self.record[at..at + 2], value);
    }

    fn read_quad(&self, at: usize) -> [u8; 4] {
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.record[at..at + 4]);
        out
    }
}
