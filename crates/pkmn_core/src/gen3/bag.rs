use log::debug;
use serde::{Deserialize, Serialize};

use super::crypto;
use super::sections::{self, SaveBlock};
pub use crate::bag::{BagSlot, Pocket, PocketKind};
use crate::bytes::{LeBytes, ensure_len};
use crate::error::CoreError;
use crate::game::Gen3Variant;

const SECURITY_SECTION: u16 = 0;
const BAG_SECTION: u16 = 1;
pub const SLOT_LEN: usize = 4;

/// Pocket placement within section 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PocketLayout {
    pub kind: PocketKind,
    pub offset: usize,
    pub capacity: usize,
}

impl PocketLayout {
    const fn new(kind: PocketKind, offset: usize, capacity: usize) -> Self {
        Self {
            kind,
            offset,
            capacity,
        }
    }
}

static RUBY_SAPPHIRE_POCKETS: [PocketLayout; 5] = [
    PocketLayout::new(PocketKind::Items, 0x0560, 20),
    PocketLayout::new(PocketKind::KeyItems, 0x05B0, 20),
    PocketLayout::new(PocketKind::PokeBalls, 0x0600, 16),
    PocketLayout::new(PocketKind::TmsHms, 0x0640, 64),
    PocketLayout::new(PocketKind::Berries, 0x0740, 46),
];

static EMERALD_POCKETS: [PocketLayout; 5] = [
    PocketLayout::new(PocketKind::Items, 0x0560, 30),
    PocketLayout::new(PocketKind::KeyItems, 0x05D8, 30),
    PocketLayout::new(PocketKind::PokeBalls, 0x0650, 16),
    PocketLayout::new(PocketKind::TmsHms, 0x0690, 64),
    PocketLayout::new(PocketKind::Berries, 0x0790, 46),
];

static FIRERED_LEAFGREEN_POCKETS: [PocketLayout; 5] = [
    PocketLayout::new(PocketKind::Items, 0x0310, 42),
    PocketLayout::new(PocketKind::KeyItems, 0x03B8, 30),
    PocketLayout::new(PocketKind::PokeBalls, 0x0430, 13),
    PocketLayout::new(PocketKind::TmsHms, 0x0464, 58),
    PocketLayout::new(PocketKind::Berries, 0x054C, 43),
];

pub fn pocket_layouts(variant: Gen3Variant) -> &'static [PocketLayout; 5] {
    match variant {
        Gen3Variant::RubySapphire => &RUBY_SAPPHIRE_POCKETS,
        Gen3Variant::Emerald => &EMERALD_POCKETS,
        Gen3Variant::FireRedLeafGreen => &FIRERED_LEAFGREEN_POCKETS,
    }
}

pub fn pocket_layout(variant: Gen3Variant, kind: PocketKind) -> PocketLayout {
    pocket_layouts(variant)
        .iter()
        .copied()
        .find(|layout| layout.kind == kind)
        .unwrap_or(PocketLayout::new(kind, 0, 0))
}

struct BagContext {
    bag_base: usize,
    key: u32,
}

fn context(
    buffer: &[u8],
    block: &SaveBlock,
    variant: Gen3Variant,
) -> Result<BagContext, CoreError> {
    block.validate_structure()?;
    let missing = |id: u16| CoreError::invalid(format!("section id {id} not present in block"));
    let section0 = block
        .find_section(SECURITY_SECTION)
        .ok_or_else(|| missing(SECURITY_SECTION))?;
    let bag_base = block
        .find_section(BAG_SECTION)
        .ok_or_else(|| missing(BAG_SECTION))?;
    Ok(BagContext {
        bag_base,
        key: crypto::security_key(buffer, variant, section0)?,
    })
}

/// Every pocket with every slot, quantities decoded.
pub fn read_pockets(
    buffer: &[u8],
    block: &SaveBlock,
    variant: Gen3Variant,
) -> Result<Vec<Pocket>, CoreError> {
    let ctx = context(buffer, block, variant)?;
    let bytes = LeBytes::new(buffer);
    let mut pockets = Vec::with_capacity(PocketKind::ALL.len());
    for layout in pocket_layouts(variant) {
        let mut slots = Vec::with_capacity(layout.capacity);
        for index in 0..layout.capacity {
            let address = ctx.bag_base + layout.offset + index * SLOT_LEN;
            let stored = bytes.read_u16(address + 2)?;
            slots.push(BagSlot {
                index,
                item_id: bytes.read_u16(address)?,
                quantity: crypto::decrypt_item_quantity(stored, variant, ctx.key),
            });
        }
        pockets.push(Pocket {
            kind: layout.kind,
            capacity: layout.capacity,
            slots,
        });
    }
    Ok(pockets)
}

/// Stores one slot with its quantity encoded under the block's security
/// key, then recomputes section 1's checksum.
pub fn write_slot(
    buffer: &mut [u8],
    block: &SaveBlock,
    variant: Gen3Variant,
    kind: PocketKind,
    index: usize,
    item_id: u16,
    quantity: u16,
) -> Result<BagSlot, CoreError> {
    let layout = pocket_layout(variant, kind);
    if index >= layout.capacity {
        return Err(CoreError::invalid(format!(
            "{kind} slot {index} out of range (capacity {})",
            layout.capacity
        )));
    }
    let ctx = context(buffer, block, variant)?;
    let address = ctx.bag_base + layout.offset + index * SLOT_LEN;
    ensure_len(buffer, address, SLOT_LEN)?;

    let stored = crypto::encrypt_item_quantity(quantity, variant, ctx.key);
    let mut bytes = LeBytes::new(&mut *buffer);
    bytes.write_u16(address, item_id)?;
    bytes.write_u16(address + 2, stored)?;
    let checksum = sections::recompute_section(buffer, block, BAG_SECTION)?;
    debug!("{kind} slot {index} = item {item_id} x{quantity}; section 1 checksum {checksum:#06x}");

    Ok(BagSlot {
        index,
        item_id,
        quantity,
    })
}
