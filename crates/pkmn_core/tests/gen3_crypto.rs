use byteorder::{ByteOrder, LittleEndian};
use pkmn_core::error::CoreErrorCode;
use pkmn_core::game::Gen3Variant;
use pkmn_core::gen3::crypto::{
    self, DecryptedPayload, EncryptedPayload, PAYLOAD_LEN, PAYLOAD_OFFSET,
};

#[test]
fn decryption_key_is_pid_xor_otid() {
    let mut record = [0u8; 80];
    LittleEndian::write_u32(&mut record[0..], 0x1234_5678);
    LittleEndian::write_u32(&mut record[4..], 0x0000_FFFF);
    assert_eq!(
        crypto::creature_decryption_key(&record, 0).unwrap(),
        0x1234_A987
    );
}

#[test]
fn decrypt_then_encrypt_restores_stored_bytes() {
    let mut record = [0u8; 80];
    for (i, byte) in record[PAYLOAD_OFFSET..].iter_mut().enumerate() {
        *byte = (i * 37 + 11) as u8;
    }
    let key = 0xC0FF_EE11;
    let plaintext = crypto::decrypt_creature_data(&record, 0, key).unwrap();
    let ciphertext = crypto::encrypt_creature_data(&plaintext, key);
    assert_eq!(&ciphertext.as_bytes()[..], &record[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_LEN]);
}

#[test]
fn encrypt_then_decrypt_restores_plaintext() {
    let plaintext = DecryptedPayload::from_words([0x0102_0304; 12]);
    let key = 0x89AB_CDEF;
    let ciphertext = plaintext.encrypt(key);
    assert_eq!(LittleEndian::read_u32(&ciphertext.as_bytes()[..4]), 0x0102_0304 ^ key);
    assert_eq!(ciphertext.decrypt(key), plaintext);
}

#[test]
fn creature_checksum_is_computed_over_plaintext() {
    let mut words = [0u32; 12];
    words[0] = 0x0003_0002;
    words[5] = 0x0010_0000;
    let plaintext = DecryptedPayload::from_words(words);
    assert_eq!(crypto::creature_checksum(&plaintext), 0x0015);

    let mut record = [0u8; 80];
    LittleEndian::write_u16(&mut record[0x1C..], 0x0015);
    let stored_ciphertext = plaintext.encrypt(0xFFFF_FFFF);
    record[PAYLOAD_OFFSET..PAYLOAD_OFFSET + PAYLOAD_LEN]
        .copy_from_slice(stored_ciphertext.as_bytes());
    let decrypted = crypto::decrypt_creature_data(&record, 0, 0xFFFF_FFFF).unwrap();
    assert_eq!(
        crypto::creature_checksum(&decrypted),
        crypto::stored_creature_checksum(&record, 0).unwrap()
    );
}

#[test]
fn payload_read_rejects_truncated_record() {
    let record = [0u8; 0x40];
    let err = EncryptedPayload::read(&record, 0).unwrap_err();
    assert_eq!(err.code(), CoreErrorCode::BufferTooShort);
}

fn section0_with_keys() -> Vec<u8> {
    let mut section = vec![0u8; 0x1000];
    LittleEndian::write_u32(&mut section[0x00AC..], 0x1122_3344);
    LittleEndian::write_u32(&mut section[0x0AF8..], 0x5566_7788);
    section
}

#[test]
fn security_key_depends_on_variant() {
    let section = section0_with_keys();
    assert_eq!(
        crypto::security_key(&section, Gen3Variant::RubySapphire, 0).unwrap(),
        0
    );
    assert_eq!(
        crypto::security_key(&section, Gen3Variant::Emerald, 0).unwrap(),
        0x1122_3344
    );
    assert_eq!(
        crypto::security_key(&section, Gen3Variant::FireRedLeafGreen, 0).unwrap(),
        0x5566_7788
    );
}

#[test]
fn security_key_read_is_bounds_checked() {
    let section = vec![0u8; 0x100];
    assert_eq!(
        crypto::security_key(&section, Gen3Variant::FireRedLeafGreen, 0)
            .unwrap_err()
            .code(),
        CoreErrorCode::BufferTooShort
    );
    assert_eq!(
        crypto::security_key(&section, Gen3Variant::RubySapphire, 0).unwrap(),
        0
    );
}

#[test]
fn item_quantity_uses_low_half_of_key() {
    let key = 0xABCD_1234;
    assert_eq!(
        crypto::decrypt_item_quantity(0x0005, Gen3Variant::RubySapphire, key),
        0x0005
    );
    assert_eq!(
        crypto::encrypt_item_quantity(5, Gen3Variant::Emerald, key),
        5 ^ 0x1234
    );
    assert_eq!(
        crypto::decrypt_item_quantity(5 ^ 0x1234, Gen3Variant::FireRedLeafGreen, key),
        5
    );
}

#[test]
fn item_quantity_round_trips_under_every_variant() {
    let key = 0x5A5A_C3C3;
    let variants = [
        Gen3Variant::RubySapphire,
        Gen3Variant::Emerald,
        Gen3Variant::FireRedLeafGreen,
    ];
    // 0x00C3 shares its low byte with the key.
    for variant in variants {
        for quantity in [0u16, 1, 0xFFFF, 0x00C3, 0xC3C3] {
            let stored = crypto::encrypt_item_quantity(quantity, variant, key);
            assert_eq!(
                crypto::decrypt_item_quantity(stored, variant, key),
                quantity,
                "{variant:?} {quantity:#06x}"
            );
            let decoded = crypto::decrypt_item_quantity(quantity, variant, key);
            assert_eq!(
                crypto::encrypt_item_quantity(decoded, variant, key),
                quantity,
                "{variant:?} {quantity:#06x}"
            );
        }
    }
}
