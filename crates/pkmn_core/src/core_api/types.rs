use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumResult;
use crate::error::CoreError;
use crate::game::{Game, Generation};
use crate::gen1::BankResult;
use crate::gen3::{BlockId, SaveBlock, SectionDescriptor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapabilityIssue {
    ChecksumMismatch,
    IndeterminateSaveBlock,
    MirageUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    pub can_validate: bool,
    pub can_recompute: bool,
    pub can_edit_creatures: bool,
    pub can_edit_bag: bool,
    pub can_edit_party: bool,
    pub can_apply_mirage: bool,
    pub issues: Vec<CapabilityIssue>,
}

impl Capabilities {
    /// Gen1 and Gen2: plain bag and party records, no encrypted creatures.
    pub fn game_boy(issues: Vec<CapabilityIssue>) -> Self {
        Self {
            can_validate: true,
            can_recompute: true,
            can_edit_creatures: false,
            can_edit_bag: true,
            can_edit_party: true,
            can_apply_mirage: false,
            issues,
        }
    }

    /// Gen3 editing needs a current block; without one only repair is possible.
    pub fn gen3(issues: Vec<CapabilityIssue>) -> Self {
        let has_current = !issues.contains(&CapabilityIssue::IndeterminateSaveBlock);
        Self {
            can_validate: true,
            can_recompute: true,
            can_edit_creatures: has_current,
            can_edit_bag: has_current,
            can_edit_party: false,
            can_apply_mirage: has_current && !issues.contains(&CapabilityIssue::MirageUnavailable),
            issues,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockReport {
    pub block: BlockId,
    pub base_address: usize,
    pub save_index: u32,
    pub structurally_valid: bool,
    pub valid: bool,
    pub table_error: Option<String>,
    pub sections: Vec<SectionDescriptor>,
}

impl BlockReport {
    pub fn from_block(block: BlockId, save_block: &SaveBlock) -> Self {
        Self {
            block,
            base_address: save_block.base_address,
            save_index: save_block.save_index,
            structurally_valid: save_block.is_structurally_valid(),
            valid: save_block.is_valid(),
            table_error: save_block.table_error.clone(),
            sections: save_block.sections.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationDetail {
    Gen1 {
        banks: Vec<BankResult>,
    },
    Gen2 {
        checksums: Vec<ChecksumResult>,
    },
    Gen3 {
        blocks: Vec<BlockReport>,
        current: Option<BlockId>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub game: Game,
    pub detail: ValidationDetail,
}

impl ValidationReport {
    pub fn generation(&self) -> Generation {
        self.game.generation()
    }

    /// Gen3 counts as valid when a current block exists; the other block may be stale.
    pub fn is_valid(&self) -> bool {
        self.first_error().is_none()
    }

    /// Every checksum in the save matches, including a stale Gen3 block.
    pub fn all_match(&self) -> bool {
        match &self.detail {
            ValidationDetail::Gen3 { blocks, .. } => blocks.iter().all(|b| b.valid),
            _ => self.is_valid(),
        }
    }

    pub fn first_error(&self) -> Option<CoreError> {
        match &self.detail {
            ValidationDetail::Gen1 { banks } => banks
                .iter()
                .flat_map(|bank| bank.checks.iter())
                .find_map(|check| check.into_mismatch()),
            ValidationDetail::Gen2 { checksums } => {
                checksums.iter().find_map(|check| check.into_mismatch())
            }
            ValidationDetail::Gen3 { current: Some(_), .. } => None,
            ValidationDetail::Gen3 { current: None, .. } => {
                Some(CoreError::IndeterminateSaveBlock)
            }
        }
    }
}
