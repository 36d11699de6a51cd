#![allow(dead_code)]

use byteorder::{ByteOrder, LittleEndian};
use pkmn_core::gen3::crypto::DecryptedPayload;
use pkmn_core::gen3::sections::{
    BLOCK_A_BASE, BLOCK_B_BASE, SECTION_ID_OFFSET, SECTION_SAVE_INDEX_OFFSET, SECTION_SLOT_SIZE,
};
use pkmn_core::gen3::{self, SAVE_SIZE};

/// A blank Gen3 save with valid checksums. Block A keeps sections in ID
/// order, block B is rotated by five slots.
pub fn gen3_save(index_a: u32, index_b: u32) -> Vec<u8> {
    let mut buffer = vec![0u8; SAVE_SIZE];
    for (base, index, rotation) in [(BLOCK_A_BASE, index_a, 0), (BLOCK_B_BASE, index_b, 5)] {
        for slot in 0..14 {
            let slot_base = base + slot * SECTION_SLOT_SIZE;
            let id = ((slot + rotation) % 14) as u16;
            LittleEndian::write_u16(&mut buffer[slot_base + SECTION_ID_OFFSET..], id);
            LittleEndian::write_u32(&mut buffer[slot_base + SECTION_SAVE_INDEX_OFFSET..], index);
        }
    }
    gen3::recompute_all(&mut buffer).expect("fresh layout should recompute");
    buffer
}

/// Base address of `section_id` in the block at `block_base`.
pub fn section_base(buffer: &[u8], block_base: usize, section_id: u16) -> usize {
    gen3::sections::parse_block(buffer, block_base)
        .expect("block should parse")
        .find_section(section_id)
        .expect("section should exist")
}

/// Writes a complete creature record header and payload at `record_base`
/// with a correct record checksum. Section checksums are left stale.
pub fn write_creature(
    buffer: &mut [u8],
    record_base: usize,
    pid: u32,
    otid: u32,
    words: [u32; 12],
) {
    let payload = DecryptedPayload::from_words(words);
    LittleEndian::write_u32(&mut buffer[record_base..], pid);
    LittleEndian::write_u32(&mut buffer[record_base + 4..], otid);
    LittleEndian::write_u16(&mut buffer[record_base + 0x1C..], payload.checksum());
    let ciphertext = payload.encrypt(pid ^ otid);
    buffer[record_base + 0x20..record_base + 0x50].copy_from_slice(ciphertext.as_bytes());
}

pub fn sample_words() -> [u32; 12] {
    [
        0x0001_0019, 0x0000_0D4A, 0x1234_5678, 0x0A0B_0C0D, 0xFFFF_0000, 0x0000_FFFF,
        0x8000_0001, 0x0102_0304, 0x0000_0000, 0x7FFF_FFFF, 0x5555_AAAA, 0x0F0F_F0F0,
    ]
}
