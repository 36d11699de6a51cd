mod common;

use byteorder::{ByteOrder, LittleEndian};
use common::{gen3_save, section_base};
use pkmn_core::core_api::{Engine, Game, GameVariant, Session};
use pkmn_core::error::CoreErrorCode;
use pkmn_core::gen3;
use pkmn_core::gen3::sections::{BLOCK_A_BASE, BLOCK_B_BASE};

fn open(bytes: Vec<u8>, variant: GameVariant) -> Session {
    Engine::new()
        .open_bytes(bytes, Game::new(variant, false))
        .expect("synthesized save should open")
}

fn save_with_lead_pid(pid: u32) -> Vec<u8> {
    let mut buffer = gen3_save(1, 2);
    let section1 = section_base(&buffer, BLOCK_B_BASE, 1);
    LittleEndian::write_u32(&mut buffer[section1 + 0x0238..], pid);
    gen3::recompute_all(&mut buffer).unwrap();
    buffer
}

#[test]
fn ruby_sapphire_copies_lead_pid_low_half() {
    let mut session = open(save_with_lead_pid(0x1234_BEEF), GameVariant::RubySapphire);
    let edit = session.apply_mirage_island().unwrap();

    let section2 = section_base(session.as_bytes(), BLOCK_B_BASE, 2);
    assert_eq!(edit.address, section2 + 0x0408);
    assert_eq!(edit.previous, 0);
    assert_eq!(edit.value, 0xBEEF);
    assert_eq!(
        LittleEndian::read_u16(&session.as_bytes()[edit.address..]),
        0xBEEF
    );
    session.verify().unwrap();
    assert!(session.is_modified());
}

#[test]
fn emerald_uses_its_own_offset() {
    let mut session = open(save_with_lead_pid(0x0000_0A0B), GameVariant::Emerald);
    let edit = session.apply_mirage_island().unwrap();
    let section2 = section_base(session.as_bytes(), BLOCK_B_BASE, 2);
    assert_eq!(edit.address, section2 + 0x0464);
    assert_eq!(edit.value, 0x0A0B);
}

#[test]
fn only_the_current_block_is_edited() {
    let buffer = save_with_lead_pid(0x0000_7777);
    let block_a_before = buffer[BLOCK_A_BASE..BLOCK_B_BASE].to_vec();
    let mut session = open(buffer, GameVariant::RubySapphire);
    session.apply_mirage_island().unwrap();
    assert_eq!(
        &session.as_bytes()[BLOCK_A_BASE..BLOCK_B_BASE],
        block_a_before.as_slice()
    );
}

#[test]
fn firered_leafgreen_has_no_mirage_island() {
    let mut session = open(gen3_save(1, 2), GameVariant::FireRedLeafGreen);
    assert!(!session.capabilities().can_apply_mirage);
    let before = session.to_bytes();
    let err = session.apply_mirage_island().unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::UnsupportedOperation);
    assert_eq!(session.as_bytes(), before.as_slice());
}
