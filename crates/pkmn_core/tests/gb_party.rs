use byteorder::{BigEndian, ByteOrder};
use pkmn_core::core_api::{Engine, Game, GameVariant, Session};
use pkmn_core::error::CoreErrorCode;

const RED_PARTY: usize = 0x2F2C;
const CRYSTAL_PARTY: usize = 0x2865;
const CRYSTAL_PARTY_COPY: usize = 0x1A65;

/// Writes a party of `species` with records of `record_len` bytes, then
/// recomputes every checksum.
fn party_save(
    variant: GameVariant,
    bases: &[usize],
    record_len: usize,
    species: &[u8],
) -> Session {
    let mut bytes = vec![0u8; 0x8000];
    for &base in bases {
        bytes[base] = species.len() as u8;
        for (index, &id) in species.iter().enumerate() {
            bytes[base + 1 + index] = id;
            bytes[base + 8 + index * record_len] = id;
        }
        bytes[base + 1 + species.len()] = 0xFF;
    }
    let mut session = Engine::new()
        .open_bytes(bytes, Game::new(variant, false))
        .expect("synthesized save should open");
    session.recompute().unwrap();
    session
}

#[test]
fn gen1_party_lists_every_member() {
    let mut bytes = vec![0u8; 0x8000];
    bytes[RED_PARTY] = 2;
    bytes[RED_PARTY + 1..RED_PARTY + 4].copy_from_slice(&[0x99, 0x54, 0xFF]);
    let first = RED_PARTY + 8;
    bytes[first] = 0x99;
    BigEndian::write_u16(&mut bytes[first + 0x01..], 31);
    bytes[first + 0x08..first + 0x0C].copy_from_slice(&[0x21, 0x2D, 0, 0]);
    BigEndian::write_u16(&mut bytes[first + 0x0C..], 0x1234);
    bytes[first + 0x0E..first + 0x11].copy_from_slice(&[0x00, 0x03, 0xE8]);
    bytes[first + 0x21] = 12;
    BigEndian::write_u16(&mut bytes[first + 0x22..], 35);
    bytes[first + 0x2C] = 0x54;

    let session = Engine::new()
        .open_bytes(bytes, Game::new(GameVariant::RedBlue, false))
        .unwrap();
    let party = session.party().unwrap();
    assert_eq!(party.len(), 2);
    let lead = &party[0];
    assert_eq!(lead.species, 0x99);
    assert_eq!(lead.level, 12);
    assert_eq!((lead.current_hp, lead.max_hp), (31, 35));
    assert_eq!(lead.moves, [0x21, 0x2D, 0, 0]);
    assert_eq!(lead.trainer_id, 0x1234);
    assert_eq!(lead.experience, 1000);
    assert_eq!(lead.held_item, None);
    assert_eq!(party[1].slot, 1);
    assert_eq!(party[1].species, 0x54);
}

#[test]
fn gen1_level_edit_updates_both_level_bytes() {
    let mut session = party_save(GameVariant::RedBlue, &[RED_PARTY], 0x2C, &[0x99]);
    let mut member = session.open_party_member(0).unwrap();
    member.set_level(50);
    member.set_experience(125_000).unwrap();
    session.commit_party_member(member).unwrap();

    let record = RED_PARTY + 8;
    assert_eq!(session.as_bytes()[record + 0x21], 50);
    assert_eq!(session.as_bytes()[record + 0x03], 50);
    assert_eq!(
        &session.as_bytes()[record + 0x0E..record + 0x11],
        &[0x01, 0xE8, 0x48]
    );
    session.verify().unwrap();
    assert!(session.is_modified());
}

#[test]
fn gen1_records_hold_no_item() {
    let session = party_save(GameVariant::RedBlue, &[RED_PARTY], 0x2C, &[0x99]);
    let mut member = session.open_party_member(0).unwrap();
    assert_eq!(
        member.set_held_item(0x01).unwrap_err().code(),
        CoreErrorCode::UnsupportedOperation
    );
    assert_eq!(member.friendship(), None);
}

#[test]
fn gen2_commit_writes_both_party_copies() {
    let mut session = party_save(
        GameVariant::Crystal,
        &[CRYSTAL_PARTY, CRYSTAL_PARTY_COPY],
        0x30,
        &[0x9B, 0x10],
    );
    let mut member = session.open_party_member(1).unwrap();
    member.set_species(0x11).unwrap();
    member.set_held_item(0xAD).unwrap();
    member.set_max_hp(0x0123);
    member.set_current_hp(0x0120);
    member.set_moves([0x21, 0x2D, 0x10, 0]);
    session.commit_party_member(member).unwrap();

    for base in [CRYSTAL_PARTY, CRYSTAL_PARTY_COPY] {
        let bytes = session.as_bytes();
        let record = base + 8 + 0x30;
        assert_eq!(bytes[base + 2], 0x11, "species list at {base:#06x}");
        assert_eq!(bytes[record], 0x11);
        assert_eq!(bytes[record + 0x01], 0xAD);
        assert_eq!(&bytes[record + 0x02..record + 0x06], &[0x21, 0x2D, 0x10, 0]);
        assert_eq!(BigEndian::read_u16(&bytes[record + 0x22..]), 0x0120);
        assert_eq!(BigEndian::read_u16(&bytes[record + 0x24..]), 0x0123);
    }
    session.verify().unwrap();

    let party = session.party().unwrap();
    assert_eq!(party[0].species, 0x9B);
    assert_eq!(party[1].held_item, Some(0xAD));
}

#[test]
fn gen2_setters_reach_their_fields() {
    let mut session = party_save(GameVariant::GoldSilver, &[0x288A, 0x10E8], 0x30, &[0x9B]);
    let mut member = session.open_party_member(0).unwrap();
    member.set_trainer_id(0xBEEF);
    member.set_dvs(0xFAAA);
    member.set_pp([35, 30, 20, 10]);
    member.set_friendship(255).unwrap();
    member.set_status(0x08);
    member.set_level(100);
    session.commit_party_member(member).unwrap();

    let record = 0x10E8 + 8;
    assert_eq!(&session.as_bytes()[record + 0x06..record + 0x08], &[0xBE, 0xEF]);
    assert_eq!(session.as_bytes()[record + 0x1F], 100);
    let reopened = session.open_party_member(0).unwrap();
    assert_eq!(reopened.trainer_id(), 0xBEEF);
    assert_eq!(reopened.dvs(), 0xFAAA);
    assert_eq!(reopened.pp(), [35, 30, 20, 10]);
    assert_eq!(reopened.friendship(), Some(255));
    assert_eq!(reopened.status(), 0x08);
    assert_eq!(reopened.level(), 100);
    assert_eq!(reopened.slot(), 0);
    session.verify().unwrap();
}

#[test]
fn empty_slots_cannot_be_opened() {
    let session = party_save(GameVariant::GoldSilver, &[0x288A, 0x10E8], 0x30, &[0x9B]);
    let err = session.open_party_member(1).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::InvalidArgument);
}

#[test]
fn out_of_range_values_leave_the_record_unchanged() {
    let session = party_save(GameVariant::GoldSilver, &[0x288A, 0x10E8], 0x30, &[0x9B]);
    let mut member = session.open_party_member(0).unwrap();
    let before = member.clone();
    assert!(member.set_experience(0x0100_0000).is_err());
    assert!(member.set_species(0).is_err());
    assert!(member.set_species(0xFF).is_err());
    assert_eq!(member, before);
}

#[test]
fn record_from_another_game_is_refused() {
    let red = party_save(GameVariant::RedBlue, &[RED_PARTY], 0x2C, &[0x99]);
    let member = red.open_party_member(0).unwrap();
    let mut crystal = party_save(
        GameVariant::Crystal,
        &[CRYSTAL_PARTY, CRYSTAL_PARTY_COPY],
        0x30,
        &[0x9B],
    );
    let before = crystal.to_bytes();
    let err = crystal.commit_party_member(member).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::InvalidArgument);
    assert_eq!(crystal.as_bytes(), before.as_slice());
}

#[test]
fn oversized_party_count_is_clamped() {
    let mut bytes = vec![0u8; 0x8000];
    bytes[CRYSTAL_PARTY] = 9;
    let session = Engine::new()
        .open_bytes(bytes, Game::new(GameVariant::Crystal, false))
        .unwrap();
    assert_eq!(session.party().unwrap().len(), 6);
}
