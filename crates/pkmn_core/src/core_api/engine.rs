use log::{debug, warn};

use crate::bytes::ensure_len;
use crate::error::CoreError;
use crate::game::{Game, Gen3Variant, Generation};
use crate::bag::{BagSlot, Pocket, PocketKind};
use crate::gb::party::{PartyMember, PartyRecord};
use crate::gb::{self, party};
use crate::gen3::bag;
use crate::gen3::creature::{self, CreatureChecksumEntry, CreatureSlot, DecryptedCreature};
use crate::gen3::mirage::{self, MirageEdit};
use crate::gen3::{self, crypto, sections};
use crate::{gen1, gen2};

use super::types::{
    BlockReport, Capabilities, CapabilityIssue, ValidationDetail, ValidationReport,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine;

/// An owned save buffer plus the game it belongs to.
///
/// Every query re-derives checksums and block selection from the buffer,
/// so nothing cached here can go stale across edits.
#[derive(Debug)]
pub struct Session {
    game: Game,
    buffer: Vec<u8>,
    capabilities: Capabilities,
    modified: bool,
}

impl Engine {
    pub fn new() -> Self {
        Self
    }

    pub fn open_bytes<B: AsRef<[u8]>>(&self, bytes: B, game: Game) -> Result<Session, CoreError> {
        let bytes = bytes.as_ref();
        ensure_len(bytes, 0, game.min_save_size())?;

        let mut session = Session {
            game,
            buffer: bytes.to_vec(),
            capabilities: Capabilities::game_boy(Vec::new()),
            modified: false,
        };
        session.refresh_capabilities()?;
        debug!("opened {} byte save as {game}", session.buffer.len());
        Ok(session)
    }
}

impl Session {
    pub fn game(&self) -> Game {
        self.game
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// The buffer with every edit applied, same length as the input.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn validate(&self) -> Result<ValidationReport, CoreError> {
        let detail = match self.game.generation() {
            Generation::One => ValidationDetail::Gen1 {
                banks: gen1::validate_save(&self.buffer, self.game.japanese)?,
            },
            Generation::Two => {
                let (variant, japanese) = (self.game.variant, self.game.japanese);
                ValidationDetail::Gen2 {
                    checksums: gen2::validate_save(&self.buffer, variant, japanese)?,
                }
            }
            Generation::Three => {
                let blocks = gen3::parse_blocks(&self.buffer)?;
                ValidationDetail::Gen3 {
                    current: blocks.current_id().ok(),
                    blocks: blocks
                        .iter()
                        .map(|(id, block)| BlockReport::from_block(id, block))
                        .collect(),
                }
            }
        };
        Ok(ValidationReport {
            game: self.game,
            detail,
        })
    }

    /// Fails with the first mismatch, or `IndeterminateSaveBlock` for a Gen3
    /// save without a valid block.
    pub fn verify(&self) -> Result<(), CoreError> {
        match self.validate()?.first_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Rewrites every checksum and returns the fresh report.
    pub fn recompute(&mut self) -> Result<ValidationReport, CoreError> {
        match self.game.generation() {
            Generation::One => {
                gen1::recompute_save(&mut self.buffer, self.game.japanese)?;
            }
            Generation::Two => {
                gen2::recompute_save(&mut self.buffer, self.game.variant, self.game.japanese)?;
            }
            Generation::Three => {
                gen3::recompute_all(&mut self.buffer)?;
            }
        }
        self.mark_modified()?;
        self.validate()
    }

    /// Creature checksums in every block with a usable section table.
    pub fn creature_audit(&self) -> Result<Vec<CreatureChecksumEntry>, CoreError> {
        let variant = self.gen3_variant("creature audit")?;
        let blocks = gen3::parse_blocks(&self.buffer)?;
        let mut entries = Vec::new();
        let mut audited = 0;
        for (id, block) in blocks.iter() {
            if !block.is_structurally_valid() {
                warn!("skipping creature audit of block {id:?}: malformed section table");
                continue;
            }
            entries.extend(creature::audit_block(&self.buffer, block, id, variant)?);
            audited += 1;
        }
        if audited == 0 {
            return Err(CoreError::IndeterminateSaveBlock);
        }
        Ok(entries)
    }

    /// Opens a creature in the current block for editing.
    pub fn open_creature(&self, slot: CreatureSlot) -> Result<DecryptedCreature, CoreError> {
        let variant = self.gen3_variant("creature editing")?;
        let blocks = gen3::parse_blocks(&self.buffer)?;
        let block = blocks.current()?;
        let span = creature::locate(&self.buffer, block, variant, slot)?;
        DecryptedCreature::open(&self.buffer, span)
    }

    /// Commits an edited creature and recomputes the checksums of the sections it occupies.
    pub fn commit_creature(&mut self, creature: DecryptedCreature) -> Result<u16, CoreError> {
        self.gen3_variant("creature editing")?;
        let blocks = gen3::parse_blocks(&self.buffer)?;
        let block = blocks.current()?;
        let section_ids = creature.span().section_ids(block);
        if section_ids.is_empty() {
            return Err(CoreError::invalid(format!(
                "{} does not lie in the current block",
                creature.slot()
            )));
        }

        let checksum = creature.commit(&mut self.buffer)?;
        for section_id in section_ids {
            sections::recompute_section(&mut self.buffer, block, section_id)?;
        }
        self.mark_modified()?;
        Ok(checksum)
    }

    /// Every pocket of the bag. Gen3 reads the current block, falling back
    /// to the readable block when neither block's checksums match.
    pub fn bag(&self) -> Result<Vec<Pocket>, CoreError> {
        let Some(variant) = self.game.variant.gen3() else {
            return gb::bag::read_pockets(&self.buffer, self.game);
        };
        let blocks = gen3::parse_blocks(&self.buffer)?;
        bag::read_pockets(&self.buffer, blocks.current_or_readable()?, variant)
    }

    /// Edits one bag slot and recomputes the checksums covering it.
    pub fn set_bag_slot(
        &mut self,
        pocket: PocketKind,
        index: usize,
        item_id: u16,
        quantity: u16,
    ) -> Result<BagSlot, CoreError> {
        let slot = match self.game.variant.gen3() {
            None => {
                gb::bag::write_slot(&mut self.buffer, self.game, pocket, index, item_id, quantity)?
            }
            Some(variant) => {
                let blocks = gen3::parse_blocks(&self.buffer)?;
                let block = blocks.current()?;
                bag::write_slot(
                    &mut self.buffer,
                    block,
                    variant,
                    pocket,
                    index,
                    item_id,
                    quantity,
                )?
            }
        };
        self.mark_modified()?;
        Ok(slot)
    }

    /// Gen1 and Gen2 party members. Gen3 parties go through
    /// [`Session::creature_audit`] and [`Session::open_creature`].
    pub fn party(&self) -> Result<Vec<PartyMember>, CoreError> {
        self.game_boy("party access")?;
        party::read_party(&self.buffer, self.game)
    }

    pub fn open_party_member(&self, slot: usize) -> Result<PartyRecord, CoreError> {
        self.game_boy("party editing")?;
        PartyRecord::open(&self.buffer, self.game, slot)
    }

    /// Writes an edited party member to every copy and recomputes checksums.
    pub fn commit_party_member(&mut self, record: PartyRecord) -> Result<(), CoreError> {
        self.game_boy("party editing")?;
        record.commit(&mut self.buffer, self.game)?;
        self.mark_modified()
    }

    pub fn apply_mirage_island(&mut self) -> Result<MirageEdit, CoreError> {
        let variant = self.gen3_variant("Mirage Island")?;
        let blocks = gen3::parse_blocks(&self.buffer)?;
        let edit = mirage::apply_mirage_island(&mut self.buffer, blocks.current()?, variant)?;
        self.mark_modified()?;
        Ok(edit)
    }

    /// Item security key of the block `bag` reads; 0 for Ruby/Sapphire.
    pub fn security_key(&self) -> Result<u32, CoreError> {
        let variant = self.gen3_variant("security key")?;
        let blocks = gen3::parse_blocks(&self.buffer)?;
        let section0 = blocks
            .current_or_readable()?
            .find_section(0)
            .ok_or_else(|| CoreError::invalid("section id 0 not present in block"))?;
        crypto::security_key(&self.buffer, variant, section0)
    }

    fn gen3_variant(&self, operation: &str) -> Result<Gen3Variant, CoreError> {
        self.game.variant.gen3().ok_or_else(|| {
            CoreError::unsupported(format!("{operation} is not available for {}", self.game))
        })
    }

    fn game_boy(&self, operation: &str) -> Result<(), CoreError> {
        match self.game.generation() {
            Generation::Three => Err(CoreError::unsupported(format!(
                "{operation} is not available for {}",
                self.game
            ))),
            _ => Ok(()),
        }
    }

    fn mark_modified(&mut self) -> Result<(), CoreError> {
        self.modified = true;
        self.refresh_capabilities()
    }

    fn refresh_capabilities(&mut self) -> Result<(), CoreError> {
        let report = self.validate()?;
        let mut issues = Vec::new();
        if let ValidationDetail::Gen3 { current: None, .. } = report.detail {
            issues.push(CapabilityIssue::IndeterminateSaveBlock);
        } else if !report.all_match() {
            issues.push(CapabilityIssue::ChecksumMismatch);
        }
        self.capabilities = match self.game.variant.gen3() {
            None => Capabilities::game_boy(issues),
            Some(variant) => {
                if mirage::mirage_offset(variant).is_none() {
                    issues.push(CapabilityIssue::MirageUnavailable);
                }
                Capabilities::gen3(issues)
            }
        };
        Ok(())
    }
}
