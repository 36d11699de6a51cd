mod common;

use common::gen3_save;
use pkmn_core::core_api::{
    CapabilityIssue, CoreErrorCode, Engine, Game, GameVariant, Generation, ValidationDetail,
};
use pkmn_core::gen3::BlockId;
use pkmn_core::gen3::sections::BLOCK_B_BASE;

#[test]
fn open_rejects_buffer_below_minimum_size() {
    let engine = Engine::new();
    for (game, len) in [
        (Game::new(GameVariant::RedBlue, false), 0x7A52),
        (Game::new(GameVariant::GoldSilver, true), 0x7FFF),
        (Game::new(GameVariant::Emerald, false), 0x1FFFF),
    ] {
        let err = engine.open_bytes(vec![0u8; len], game).unwrap_err();
        assert_eq!(err.code(), CoreErrorCode::BufferTooShort, "{game}");
    }
}

#[test]
fn gen1_accepts_minimum_size_and_keeps_length() {
    let session = Engine::new()
        .open_bytes(vec![0u8; 0x7A53], Game::new(GameVariant::RedBlue, false))
        .expect("minimum-size save should open");
    assert_eq!(session.game().generation(), Generation::One);
    assert_eq!(session.to_bytes().len(), 0x7A53);
}

#[test]
fn gen1_validate_then_recompute_then_verify() {
    let mut session = Engine::new()
        .open_bytes(vec![0u8; 0x8000], Game::new(GameVariant::RedBlue, false))
        .unwrap();
    let report = session.validate().unwrap();
    assert!(!report.is_valid());
    assert_eq!(
        session.verify().unwrap_err().code(),
        CoreErrorCode::ChecksumMismatch
    );
    assert!(
        session
            .capabilities()
            .issues
            .contains(&CapabilityIssue::ChecksumMismatch)
    );

    let report = session.recompute().unwrap();
    assert!(report.is_valid());
    assert!(report.all_match());
    session.verify().unwrap();
    assert!(session.capabilities().issues.is_empty());
    assert!(session.is_modified());
    assert_eq!(session.as_bytes()[0x3523], 0xFF);
}

#[test]
fn gen2_report_lists_two_checksums() {
    let session = Engine::new()
        .open_bytes(vec![0u8; 0x8000], Game::new(GameVariant::Crystal, false))
        .unwrap();
    let report = session.validate().unwrap();
    match &report.detail {
        ValidationDetail::Gen2 { checksums } => {
            assert_eq!(checksums.len(), 2);
            assert!(checksums.iter().all(|c| c.matches));
        }
        other => panic!("unexpected detail {other:?}"),
    }
    let caps = session.capabilities();
    assert!(caps.can_recompute);
    assert!(caps.can_edit_bag);
    assert!(caps.can_edit_party);
    assert!(!caps.can_edit_creatures);
}

#[test]
fn gen3_report_names_current_block() {
    let session = Engine::new()
        .open_bytes(gen3_save(5, 6), Game::new(GameVariant::Emerald, false))
        .unwrap();
    let report = session.validate().unwrap();
    match &report.detail {
        ValidationDetail::Gen3 { blocks, current } => {
            assert_eq!(*current, Some(BlockId::B));
            assert_eq!(blocks.len(), 2);
            assert!(blocks.iter().all(|b| b.valid && b.sections.len() == 14));
            assert_eq!(blocks[1].base_address, BLOCK_B_BASE);
        }
        other => panic!("unexpected detail {other:?}"),
    }
    assert!(session.capabilities().can_edit_creatures);
}

#[test]
fn gen3_stale_older_block_is_valid_but_not_all_matching() {
    let mut bytes = gen3_save(5, 6);
    bytes[0x10] ^= 0xFF;
    let mut session = Engine::new()
        .open_bytes(bytes, Game::new(GameVariant::RubySapphire, false))
        .unwrap();
    let report = session.validate().unwrap();
    assert!(report.is_valid());
    assert!(!report.all_match());

    let report = session.recompute().unwrap();
    assert!(report.all_match());
}

#[test]
fn gen3_without_valid_block_is_indeterminate_until_recomputed() {
    let mut bytes = gen3_save(5, 6);
    bytes[0x10] ^= 0xFF;
    bytes[BLOCK_B_BASE + 0x10] ^= 0xFF;
    let mut session = Engine::new()
        .open_bytes(bytes, Game::new(GameVariant::FireRedLeafGreen, false))
        .unwrap();
    assert_eq!(
        session.verify().unwrap_err().code(),
        CoreErrorCode::IndeterminateSaveBlock
    );
    assert!(!session.capabilities().can_edit_bag);

    session.recompute().unwrap();
    session.verify().unwrap();
    assert!(session.capabilities().can_edit_bag);
}

#[test]
fn gen3_recompute_fails_closed_on_malformed_tables() {
    let mut session = Engine::new()
        .open_bytes(vec![0u8; 0x20000], Game::new(GameVariant::Emerald, false))
        .unwrap();
    let before = session.to_bytes();
    let err = session.recompute().unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::IndeterminateSaveBlock);
    assert_eq!(session.as_bytes(), before.as_slice());
    assert!(!session.is_modified());
}

#[test]
fn game_names_parse_with_aliases() {
    assert_eq!("Emerald".parse::<GameVariant>().unwrap(), GameVariant::Emerald);
    assert_eq!(
        "pokemon_fire_red".parse::<GameVariant>().unwrap(),
        GameVariant::FireRedLeafGreen
    );
    assert_eq!("yellow".parse::<GameVariant>().unwrap(), GameVariant::RedBlue);
    assert_eq!(
        "stadium".parse::<GameVariant>().unwrap_err().code(),
        CoreErrorCode::InvalidArgument
    );
}

#[test]
fn validation_report_serializes() {
    let session = Engine::new()
        .open_bytes(gen3_save(1, 2), Game::new(GameVariant::RubySapphire, false))
        .unwrap();
    let value = serde_json::to_value(session.validate().unwrap()).unwrap();
    assert_eq!(value["game"]["variant"], "RubySapphire");
    assert_eq!(value["detail"]["Gen3"]["current"], "B");
}
