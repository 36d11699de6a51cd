//! Generation 3 flash saves: two rotating save blocks of 14 sections each.

pub mod bag;
pub mod creature;
pub mod crypto;
pub mod mirage;
pub mod sections;

use log::warn;

use crate::bytes::ensure_len;
use crate::error::CoreError;

pub use sections::{BlockId, SaveBlock, SectionDescriptor};

pub const SAVE_SIZE: usize = 0x20000;

/// Both save blocks of one buffer, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gen3Blocks {
    pub a: SaveBlock,
    pub b: SaveBlock,
}

impl Gen3Blocks {
    pub fn block(&self, id: BlockId) -> &SaveBlock {
        match id {
            BlockId::A => &self.a,
            BlockId::B => &self.b,
        }
    }

    pub fn current_id(&self) -> Result<BlockId, CoreError> {
        sections::determine_current_block(&self.a, &self.b)
    }

    pub fn current(&self) -> Result<&SaveBlock, CoreError> {
        Ok(self.block(self.current_id()?))
    }

    /// Best-effort block for read-only inspection; ignores section checksums.
    pub fn readable(&self) -> Result<(BlockId, &SaveBlock), CoreError> {
        let id = sections::determine_readable_block(&self.a, &self.b)?;
        Ok((id, self.block(id)))
    }

    /// The current block if there is one, else the readable block.
    pub fn current_or_readable(&self) -> Result<&SaveBlock, CoreError> {
        match self.current() {
            Ok(block) => Ok(block),
            Err(CoreError::IndeterminateSaveBlock) => {
                let (id, block) = self.readable()?;
                warn!("no block passes its checksums; reading block {id:?} as is");
                Ok(block)
            }
            Err(err) => Err(err),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (BlockId, &SaveBlock)> {
        [(BlockId::A, &self.a), (BlockId::B, &self.b)].into_iter()
    }
}

pub fn parse_blocks(buffer: &[u8]) -> Result<Gen3Blocks, CoreError> {
    ensure_len(buffer, 0, SAVE_SIZE)?;
    Ok(Gen3Blocks {
        a: sections::parse_block(buffer, BlockId::A.base_address())?,
        b: sections::parse_block(buffer, BlockId::B.base_address())?,
    })
}

/// Rewrites section checksums in every structurally valid block.
///
/// Writes nothing and fails with `IndeterminateSaveBlock` when neither
/// block has a usable section table.
pub fn recompute_all(buffer: &mut [u8]) -> Result<Gen3Blocks, CoreError> {
    let blocks = parse_blocks(buffer)?;
    if !blocks.a.is_structurally_valid() && !blocks.b.is_structurally_valid() {
        return Err(CoreError::IndeterminateSaveBlock);
    }
    for (id, block) in blocks.iter() {
        if block.is_structurally_valid() {
            sections::recompute_block(buffer, block.base_address)?;
        } else {
            warn!(
                "leaving block {id:?} untouched: {}",
                block.table_error.as_deref().unwrap_or("malformed")
            );
        }
    }
    parse_blocks(buffer)
}
