//! Game Boy bag pockets.
//!
//! List pockets hold a count byte, up to `capacity` entries and a 0xFF
//! terminator; unused entries after the terminator are zero. The Gen2
//! TM/HM pocket is a flat array of quantities, one per machine.

use log::{debug, warn};

use crate::bag::{BagSlot, Pocket, PocketKind};
use crate::bytes::{LeBytes, ensure_len};
use crate::error::CoreError;
use crate::game::{Game, GameVariant};

use super::recompute_checksums;

const TERMINATOR: u8 = 0xFF;

pub const TM_COUNT: usize = 50;
pub const HM_COUNT: usize = 7;
const FIRST_TM_ID: u8 = 0xBF;
const FIRST_HM_ID: u8 = 0xF3;
/// Item IDs between TM01 and TM50 that belong to no machine.
const TM_ID_GAPS: [u8; 2] = [0xC3, 0xDC];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PocketFormat {
    /// `(item, quantity)` pairs.
    Counted,
    /// Item IDs only; each held once.
    IdsOnly,
    /// One quantity byte per TM and HM.
    Machines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GbPocketLayout {
    pub kind: PocketKind,
    pub format: PocketFormat,
    pub capacity: usize,
    pub primary: usize,
    /// Gen2 second copy.
    pub mirror: Option<usize>,
}

impl GbPocketLayout {
    const fn new(
        kind: PocketKind,
        format: PocketFormat,
        capacity: usize,
        primary: usize,
        mirror: Option<usize>,
    ) -> Self {
        Self {
            kind,
            format,
            capacity,
            primary,
            mirror,
        }
    }

    fn entry_len(&self) -> usize {
        match self.format {
            PocketFormat::Counted => 2,
            PocketFormat::IdsOnly | PocketFormat::Machines => 1,
        }
    }

    /// Bytes the pocket occupies, count byte and terminator included.
    pub fn byte_len(&self) -> usize {
        match self.format {
            PocketFormat::Machines => self.capacity,
            _ => 1 + self.capacity * self.entry_len() + 1,
        }
    }

    fn copies(&self) -> impl Iterator<Item = usize> {
        std::iter::once(self.primary).chain(self.mirror)
    }
}

use PocketFormat::{Counted, IdsOnly, Machines};
use PocketKind::{Items, KeyItems, PokeBalls, TmsHms};

const MACHINES: usize = TM_COUNT + HM_COUNT;

static RED_BLUE_INTERNATIONAL: [GbPocketLayout; 1] =
    [GbPocketLayout::new(Items, Counted, 20, 0x25C9, None)];

static RED_BLUE_JAPANESE: [GbPocketLayout; 1] =
    [GbPocketLayout::new(Items, Counted, 20, 0x25C4, None)];

static GOLD_SILVER_INTERNATIONAL: [GbPocketLayout; 4] = [
    GbPocketLayout::new(Items, Counted, 20, 0x241F, Some(0x0CB1)),
    GbPocketLayout::new(KeyItems, IdsOnly, 25, 0x2449, Some(0x0CDB)),
    GbPocketLayout::new(PokeBalls, Counted, 12, 0x2464, Some(0x0CF6)),
    GbPocketLayout::new(TmsHms, Machines, MACHINES, 0x23E6, Some(0x0C78)),
];

static GOLD_SILVER_JAPANESE: [GbPocketLayout; 4] = [
    GbPocketLayout::new(Items, Counted, 20, 0x2400, Some(0x7600)),
    GbPocketLayout::new(KeyItems, IdsOnly, 25, 0x242A, Some(0x762A)),
    GbPocketLayout::new(PokeBalls, Counted, 12, 0x2445, Some(0x7645)),
    GbPocketLayout::new(TmsHms, Machines, MACHINES, 0x23C7, Some(0x75C7)),
];

static CRYSTAL_INTERNATIONAL: [GbPocketLayout; 4] = [
    GbPocketLayout::new(Items, Counted, 20, 0x2420, Some(0x1620)),
    GbPocketLayout::new(KeyItems, IdsOnly, 25, 0x244A, Some(0x164A)),
    GbPocketLayout::new(PokeBalls, Counted, 12, 0x2465, Some(0x1665)),
    GbPocketLayout::new(TmsHms, Machines, MACHINES, 0x23E7, Some(0x15E7)),
];

static CRYSTAL_JAPANESE: [GbPocketLayout; 4] = [
    GbPocketLayout::new(Items, Counted, 20, 0x2402, Some(0x7602)),
    GbPocketLayout::new(KeyItems, IdsOnly, 25, 0x242C, Some(0x762C)),
    GbPocketLayout::new(PokeBalls, Counted, 12, 0x2447, Some(0x7647)),
    GbPocketLayout::new(TmsHms, Machines, MACHINES, 0x23C9, Some(0x75C9)),
];

pub fn pocket_layouts(game: Game) -> Result<&'static [GbPocketLayout], CoreError> {
    let layouts: &'static [GbPocketLayout] = match (game.variant, game.japanese) {
        (GameVariant::RedBlue, false) => &RED_BLUE_INTERNATIONAL,
        (GameVariant::RedBlue, true) => &RED_BLUE_JAPANESE,
        (GameVariant::GoldSilver, false) => &GOLD_SILVER_INTERNATIONAL,
        (GameVariant::GoldSilver, true) => &GOLD_SILVER_JAPANESE,
        (GameVariant::Crystal, false) => &CRYSTAL_INTERNATIONAL,
        (GameVariant::Crystal, true) => &CRYSTAL_JAPANESE,
        _ => {
            return Err(CoreError::unsupported(format!(
                "{game} has no Game Boy bag layout"
            )));
        }
    };
    Ok(layouts)
}

fn pocket_layout(game: Game, kind: PocketKind) -> Result<GbPocketLayout, CoreError> {
    pocket_layouts(game)?
        .iter()
        .copied()
        .find(|layout| layout.kind == kind)
        .ok_or_else(|| CoreError::invalid(format!("{game} has no {kind} pocket")))
}

/// Item ID of TM/HM pocket slot `index`: TM01..TM50, then HM01..HM07.
pub fn machine_item_id(index: usize) -> Option<u8> {
    if index >= MACHINES {
        return None;
    }
    if index >= TM_COUNT {
        return Some(FIRST_HM_ID + (index - TM_COUNT) as u8);
    }
    let mut id = FIRST_TM_ID + index as u8;
    for gap in TM_ID_GAPS {
        if id >= gap {
            id += 1;
        }
    }
    Some(id)
}

/// Entries up to the count byte or the first terminator.
fn read_entries(buffer: &[u8], layout: &GbPocketLayout) -> Result<Vec<(u8, u8)>, CoreError> {
    let bytes = LeBytes::new(buffer);
    let mut count = usize::from(bytes.read_u8(layout.primary)?);
    if count > layout.capacity {
        warn!(
            "{} count {count} exceeds capacity {}; reading {} entries",
            layout.kind, layout.capacity, layout.capacity
        );
        count = layout.capacity;
    }
    let mut entries = Vec::with_capacity(count);
    for index in 0..count {
        let address = layout.primary + 1 + index * layout.entry_len();
        let item_id = bytes.read_u8(address)?;
        if item_id == TERMINATOR {
            break;
        }
        let quantity = match layout.format {
            Counted => bytes.read_u8(address + 1)?,
            _ => 1,
        };
        entries.push((item_id, quantity));
    }
    Ok(entries)
}

fn encode_entries(layout: &GbPocketLayout, entries: &[(u8, u8)]) -> Vec<u8> {
    let mut encoded = vec![0u8; layout.byte_len()];
    encoded[0] = entries.len() as u8;
    let mut at = 1;
    for &(item_id, quantity) in entries {
        encoded[at] = item_id;
        if layout.format == Counted {
            encoded[at + 1] = quantity;
        }
        at += layout.entry_len();
    }
    encoded[at] = TERMINATOR;
    encoded
}

fn read_pocket(buffer: &[u8], layout: &GbPocketLayout) -> Result<Pocket, CoreError> {
    ensure_len(buffer, layout.primary, layout.byte_len())?;
    let slots = match layout.format {
        Machines => {
            let bytes = LeBytes::new(buffer);
            let quantities = bytes.slice(layout.primary, layout.capacity)?;
            quantities
                .iter()
                .enumerate()
                .map(|(index, &quantity)| BagSlot {
                    index,
                    item_id: machine_item_id(index).map_or(0, u16::from),
                    quantity: u16::from(quantity),
                })
                .collect()
        }
        Counted | IdsOnly => {
            let entries = read_entries(buffer, layout)?;
            (0..layout.capacity)
                .map(|index| match entries.get(index) {
                    Some(&(item_id, quantity)) => BagSlot {
                        index,
                        item_id: u16::from(item_id),
                        quantity: u16::from(quantity),
                    },
                    None => BagSlot::empty(index),
                })
                .collect()
        }
    };
    Ok(Pocket {
        kind: layout.kind,
        capacity: layout.capacity,
        slots,
    })
}

/// Every pocket of the primary copy, unused slots reported empty.
pub fn read_pockets(buffer: &[u8], game: Game) -> Result<Vec<Pocket>, CoreError> {
    pocket_layouts(game)?
        .iter()
        .map(|layout| read_pocket(buffer, layout))
        .collect()
}

fn narrow(value: u16, what: &str) -> Result<u8, CoreError> {
    u8::try_from(value)
        .map_err(|_| CoreError::invalid(format!("{what} {value} does not fit in one byte")))
}

/// Edits one slot in every copy of the pocket, then recomputes checksums.
///
/// In a list pocket `index` may name a held entry or the first free slot.
/// An item ID of 0, or a quantity of 0 outside the key pocket, removes the
/// entry and shifts the rest up.
pub fn write_slot(
    buffer: &mut [u8],
    game: Game,
    kind: PocketKind,
    index: usize,
    item_id: u16,
    quantity: u16,
) -> Result<BagSlot, CoreError> {
    let layout = pocket_layout(game, kind)?;
    if index >= layout.capacity {
        return Err(CoreError::invalid(format!(
            "{kind} slot {index} out of range (capacity {})",
            layout.capacity
        )));
    }
    for base in layout.copies() {
        ensure_len(buffer, base, layout.byte_len())?;
    }
    let id = narrow(item_id, "item id")?;
    let count = narrow(quantity, "quantity")?;

    let (encoded, written) = match layout.format {
        Machines => {
            let expected = machine_item_id(index).unwrap_or(0);
            if id != 0 && id != expected {
                return Err(CoreError::invalid(format!(
                    "{kind} slot {index} holds item {expected:#04x}, not {id:#04x}"
                )));
            }
            let slot = BagSlot {
                index,
                item_id: u16::from(expected),
                quantity,
            };
            (vec![count], slot)
        }
        Counted | IdsOnly => {
            if id == TERMINATOR {
                return Err(CoreError::invalid(format!(
                    "item id {TERMINATOR:#04x} ends a pocket list"
                )));
            }
            let mut entries = read_entries(buffer, &layout)?;
            let removing = id == 0 || (layout.format == Counted && count == 0);
            let held = if layout.format == IdsOnly { 1 } else { count };
            if index < entries.len() {
                if removing {
                    entries.remove(index);
                } else {
                    entries[index] = (id, held);
                }
            } else if index == entries.len() {
                if !removing {
                    entries.push((id, held));
                }
            } else {
                return Err(CoreError::invalid(format!(
                    "{kind} holds {} items; slot {index} would leave a gap",
                    entries.len()
                )));
            }
            let slot = if removing {
                BagSlot::empty(index)
            } else {
                BagSlot {
                    index,
                    item_id,
                    quantity: u16::from(held),
                }
            };
            (encode_entries(&layout, &entries), slot)
        }
    };

    let offset = match layout.format {
        Machines => index,
        _ => 0,
    };
    let mut bytes = LeBytes::new(&mut *buffer);
    for base in layout.copies() {
        bytes.write_bytes(base + offset, &encoded)?;
    }
    recompute_checksums(buffer, game)?;
    debug!(
        "{kind} slot {index} = item {:#04x} x{} in {game}",
        written.item_id, written.quantity
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_ids_skip_the_gaps() {
        assert_eq!(machine_item_id(0), Some(0xBF));
        assert_eq!(machine_item_id(3), Some(0xC2));
        assert_eq!(machine_item_id(4), Some(0xC4));
        assert_eq!(machine_item_id(27), Some(0xDB));
        assert_eq!(machine_item_id(28), Some(0xDD));
        assert_eq!(machine_item_id(49), Some(0xF2));
        assert_eq!(machine_item_id(50), Some(0xF3));
        assert_eq!(machine_item_id(56), Some(0xF9));
        assert_eq!(machine_item_id(57), None);
    }

    #[test]
    fn list_pockets_fit_before_the_next_one() {
        for japanese in [false, true] {
            for variant in [GameVariant::GoldSilver, GameVariant::Crystal] {
                let layouts = pocket_layouts(Game::new(variant, japanese)).unwrap();
                let tms = layouts.iter().find(|l| l.kind == TmsHms).unwrap();
                let items = layouts.iter().find(|l| l.kind == Items).unwrap();
                let keys = layouts.iter().find(|l| l.kind == KeyItems).unwrap();
                let balls = layouts.iter().find(|l| l.kind == PokeBalls).unwrap();
                for (first, next) in [(tms, items), (items, keys), (keys, balls)] {
                    assert_eq!(first.primary + first.byte_len(), next.primary);
                    assert_eq!(
                        first.mirror.unwrap() + first.byte_len(),
                        next.mirror.unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn encoded_list_is_terminated_and_zero_filled() {
        let layout = RED_BLUE_INTERNATIONAL[0];
        let encoded = encode_entries(&layout, &[(0x14, 3), (0x04, 99)]);
        assert_eq!(encoded.len(), 42);
        assert_eq!(&encoded[..6], &[2, 0x14, 3, 0x04, 99, TERMINATOR]);
        assert!(encoded[6..].iter().all(|&b| b == 0));
    }
}
