mod common;

use byteorder::{ByteOrder, LittleEndian};
use common::{gen3_save, section_base};
use pkmn_core::core_api::{Engine, Game, GameVariant, Session};
use pkmn_core::error::CoreErrorCode;
use pkmn_core::gen3::bag::{self, PocketKind};
use pkmn_core::gen3::sections::{BLOCK_A_BASE, BLOCK_B_BASE};
use pkmn_core::gen3;

fn open(bytes: Vec<u8>, variant: GameVariant) -> Session {
    Engine::new()
        .open_bytes(bytes, Game::new(variant, false))
        .expect("synthesized save should open")
}

/// Save whose current block (B) carries `key` at `key_offset` in section 0.
fn keyed_save(key_offset: usize, key: u32) -> Vec<u8> {
    let mut buffer = gen3_save(1, 2);
    let section0 = section_base(&buffer, BLOCK_B_BASE, 0);
    LittleEndian::write_u32(&mut buffer[section0 + key_offset..], key);
    gen3::recompute_all(&mut buffer).unwrap();
    buffer
}

/// Flips a byte of section 4 so the block keeps its table but fails its checksums.
fn corrupt_block(buffer: &mut [u8], block_base: usize) {
    let address = section_base(buffer, block_base, 4) + 0x10;
    buffer[address] ^= 0xFF;
}

#[test]
fn pocket_tables_follow_variant() {
    use pkmn_core::game::Gen3Variant;

    let emerald = bag::pocket_layouts(Gen3Variant::Emerald);
    assert_eq!(emerald[0].offset, 0x0560);
    assert_eq!(emerald[0].capacity, 30);
    let frlg = bag::pocket_layouts(Gen3Variant::FireRedLeafGreen);
    assert_eq!(frlg[2].kind, PocketKind::PokeBalls);
    assert_eq!(frlg[2].capacity, 13);
    let rs = bag::pocket_layouts(Gen3Variant::RubySapphire);
    assert_eq!(rs[4].offset, 0x0740);
}

#[test]
fn emerald_quantity_is_stored_masked() {
    let mut session = open(keyed_save(0x00AC, 0xABCD_1234), GameVariant::Emerald);
    assert_eq!(session.security_key().unwrap(), 0xABCD_1234);

    session.set_bag_slot(PocketKind::Items, 0, 13, 5).unwrap();
    session.verify().unwrap();

    let section1 = section_base(session.as_bytes(), BLOCK_B_BASE, 1);
    let raw = &session.as_bytes()[section1 + 0x0560..];
    assert_eq!(LittleEndian::read_u16(raw), 13);
    assert_eq!(LittleEndian::read_u16(&raw[2..]), 5 ^ 0x1234);

    let pockets = session.bag().unwrap();
    let items = &pockets[0];
    assert_eq!(items.kind, PocketKind::Items);
    assert_eq!(items.slots.len(), 30);
    assert_eq!(items.slots[0].item_id, 13);
    assert_eq!(items.slots[0].quantity, 5);
}

#[test]
fn empty_slots_decode_to_the_key_for_keyed_variants() {
    let session = open(keyed_save(0x0AF8, 0x0000_00FF), GameVariant::FireRedLeafGreen);
    let pockets = session.bag().unwrap();
    assert!(pockets[1].slots.iter().all(|s| s.is_empty()));
    assert_eq!(pockets[1].slots[0].quantity, 0x00FF);
}

#[test]
fn ruby_sapphire_quantity_is_stored_plain() {
    // A stray value at the Emerald key offset must be ignored.
    let mut session = open(keyed_save(0x00AC, 0xFFFF_FFFF), GameVariant::RubySapphire);
    assert_eq!(session.security_key().unwrap(), 0);

    session.set_bag_slot(PocketKind::Berries, 45, 133, 7).unwrap();
    let section1 = section_base(session.as_bytes(), BLOCK_B_BASE, 1);
    let address = section1 + 0x0740 + 45 * 4;
    assert_eq!(LittleEndian::read_u16(&session.as_bytes()[address + 2..]), 7);
    session.verify().unwrap();
}

#[test]
fn slot_beyond_capacity_is_rejected_without_writing() {
    let mut session = open(gen3_save(1, 2), GameVariant::RubySapphire);
    let before = session.to_bytes();
    let err = session
        .set_bag_slot(PocketKind::PokeBalls, 16, 4, 1)
        .unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::InvalidArgument);
    assert_eq!(session.as_bytes(), before.as_slice());
}

#[test]
fn gen3_has_no_game_boy_party() {
    let session = open(gen3_save(1, 2), GameVariant::Emerald);
    assert_eq!(
        session.party().unwrap_err().code(),
        CoreErrorCode::UnsupportedOperation
    );
    assert!(!session.capabilities().can_edit_party);
}

#[test]
fn bag_reads_best_effort_when_both_blocks_mismatch() {
    let mut session = open(keyed_save(0x00AC, 0xABCD_1234), GameVariant::Emerald);
    session.set_bag_slot(PocketKind::Items, 0, 13, 5).unwrap();
    let mut buffer = session.into_bytes();
    corrupt_block(&mut buffer, BLOCK_A_BASE);
    corrupt_block(&mut buffer, BLOCK_B_BASE);

    let mut session = open(buffer, GameVariant::Emerald);
    assert_eq!(
        session.verify().unwrap_err().code(),
        CoreErrorCode::IndeterminateSaveBlock
    );
    assert_eq!(session.security_key().unwrap(), 0xABCD_1234);
    let pockets = session.bag().unwrap();
    assert_eq!(pockets[0].slots[0].item_id, 13);
    assert_eq!(pockets[0].slots[0].quantity, 5);

    let before = session.to_bytes();
    let err = session
        .set_bag_slot(PocketKind::Items, 1, 14, 1)
        .unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::IndeterminateSaveBlock);
    assert_eq!(session.as_bytes(), before.as_slice());
}

#[test]
fn bag_prefers_the_valid_block_over_a_newer_corrupt_one() {
    let mut buffer = keyed_save(0x00AC, 0xABCD_1234);
    corrupt_block(&mut buffer, BLOCK_B_BASE);

    let session = open(buffer, GameVariant::Emerald);
    // Block A is current and carries no key.
    assert_eq!(session.security_key().unwrap(), 0);
    assert!(session.bag().unwrap()[0].slots.iter().all(|s| s.is_empty()));
}
