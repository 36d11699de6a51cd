use log::info;
use serde::{Deserialize, Serialize};

use super::sections::{self, SaveBlock};
use crate::bytes::LeBytes;
use crate::error::CoreError;
use crate::game::Gen3Variant;

/// Low half of the first party member's PID, relative to section 1.
const LEAD_PID_OFFSET: usize = 0x0238;
const PARTY_SECTION: u16 = 1;
const MIRAGE_SECTION: u16 = 2;

/// Offset of the Mirage Island value within section 2.
pub fn mirage_offset(variant: Gen3Variant) -> Option<usize> {
    match variant {
        Gen3Variant::RubySapphire => Some(0x0408),
        Gen3Variant::Emerald => Some(0x0464),
        Gen3Variant::FireRedLeafGreen => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirageEdit {
    pub address: usize,
    pub previous: u16,
    pub value: u16,
    pub section_checksum: u16,
}

/// Makes Mirage Island appear by matching its value to the lead creature's PID.
pub fn apply_mirage_island(
    buffer: &mut [u8],
    block: &SaveBlock,
    variant: Gen3Variant,
) -> Result<MirageEdit, CoreError> {
    let offset = mirage_offset(variant).ok_or_else(|| {
        CoreError::unsupported(format!("Mirage Island is not present in {variant:?}"))
    })?;
    block.validate_structure()?;
    let missing = |id: u16| CoreError::invalid(format!("section id {id} not present in block"));
    let party = block
        .find_section(PARTY_SECTION)
        .ok_or_else(|| missing(PARTY_SECTION))?;
    let target = block
        .find_section(MIRAGE_SECTION)
        .ok_or_else(|| missing(MIRAGE_SECTION))?;

    let mut bytes = LeBytes::new(&mut *buffer);
    let value = bytes.read_u16(party + LEAD_PID_OFFSET)?;
    let address = target + offset;
    let previous = bytes.read_u16(address)?;
    bytes.write_u16(address, value)?;
    let section_checksum = sections::recompute_section(buffer, block, MIRAGE_SECTION)?;

    info!("Mirage Island value {previous:#06x} -> {value:#06x} at {address:#07x}");
    Ok(MirageEdit {
        address,
        previous,
        value,
        section_checksum,
    })
}
