use byteorder::{ByteOrder, LittleEndian};

use crate::bytes::{LeBytes, offset_from};
use crate::error::CoreError;
use crate::game::Gen3Variant;

pub const PID_OFFSET: usize = 0x00;
pub const OTID_OFFSET: usize = 0x04;
pub const CHECKSUM_OFFSET: usize = 0x1C;
pub const PAYLOAD_OFFSET: usize = 0x20;
pub const PAYLOAD_LEN: usize = 48;
pub const PAYLOAD_WORDS: usize = PAYLOAD_LEN / 4;

/// The 48-byte creature payload exactly as stored in the save.
///
/// The record checksum is defined over plaintext and is only available on
/// [`DecryptedPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptedPayload([u8; PAYLOAD_LEN]);

/// Twelve plaintext payload words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptedPayload([u32; PAYLOAD_WORDS]);

impl EncryptedPayload {
    pub fn read(buffer: &[u8], record_base: usize) -> Result<Self, CoreError> {
        let address = offset_from(buffer, record_base, PAYLOAD_OFFSET)?;
        Ok(Self(LeBytes::new(buffer).read_array(address)?))
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }

    pub fn decrypt(&self, key: u32) -> DecryptedPayload {
        let mut words = [0u32; PAYLOAD_WORDS];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(4)) {
            *word = LittleEndian::read_u32(chunk) ^ key;
        }
        DecryptedPayload(words)
    }
}

impl DecryptedPayload {
    pub fn from_words(words: [u32; PAYLOAD_WORDS]) -> Self {
        Self(words)
    }

    pub fn words(&self) -> &[u32; PAYLOAD_WORDS] {
        &self.0
    }

    pub fn word(&self, index: usize) -> Result<u32, CoreError> {
        self.0
            .get(index)
            .copied()
            .ok_or_else(|| word_out_of_range(index))
    }

    pub fn set_word(&mut self, index: usize, value: u32) -> Result<(), CoreError> {
        let word = self.0.get_mut(index).ok_or_else(|| word_out_of_range(index))?;
        *word = value;
        Ok(())
    }

    /// Halfword `index` in storage order: even indices are the low half of a word.
    pub fn halfword(&self, index: usize) -> Result<u16, CoreError> {
        let word = self.word(index / 2)?;
        Ok(if index % 2 == 0 {
            word as u16
        } else {
            (word >> 16) as u16
        })
    }

    pub fn set_halfword(&mut self, index: usize, value: u16) -> Result<(), CoreError> {
        let word = self.word(index / 2)?;
        let updated = if index % 2 == 0 {
            (word & 0xFFFF_0000) | u32::from(value)
        } else {
            (word & 0x0000_FFFF) | (u32::from(value) << 16)
        };
        self.set_word(index / 2, updated)
    }

    /// Sum of every 16-bit half of every word, truncated to 16 bits.
    pub fn checksum(&self) -> u16 {
        self.0.iter().fold(0u16, |acc, &word| {
            acc.wrapping_add(word as u16).wrapping_add((word >> 16) as u16)
        })
    }

    pub fn encrypt(&self, key: u32) -> EncryptedPayload {
        let mut bytes = [0u8; PAYLOAD_LEN];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.0.iter()) {
            LittleEndian::write_u32(chunk, word ^ key);
        }
        EncryptedPayload(bytes)
    }
}

fn word_out_of_range(index: usize) -> CoreError {
    CoreError::invalid(format!(
        "payload word {index} out of range (payload has {PAYLOAD_WORDS} words)"
    ))
}

/// PID XOR OTID of the record at `record_base`.
pub fn creature_decryption_key(buffer: &[u8], record_base: usize) -> Result<u32, CoreError> {
    let bytes = LeBytes::new(buffer);
    let pid = bytes.read_u32(offset_from(buffer, record_base, PID_OFFSET)?)?;
    let otid = bytes.read_u32(offset_from(buffer, record_base, OTID_OFFSET)?)?;
    Ok(pid ^ otid)
}

pub fn decrypt_creature_data(
    buffer: &[u8],
    record_base: usize,
    key: u32,
) -> Result<DecryptedPayload, CoreError> {
    Ok(EncryptedPayload::read(buffer, record_base)?.decrypt(key))
}

/// Pure: produces ciphertext but writes nothing. Committing a record goes
/// through `creature::DecryptedCreature::commit`, which also stores the checksum.
pub fn encrypt_creature_data(payload: &DecryptedPayload, key: u32) -> EncryptedPayload {
    payload.encrypt(key)
}

pub fn creature_checksum(payload: &DecryptedPayload) -> u16 {
    payload.checksum()
}

pub fn stored_creature_checksum(buffer: &[u8], record_base: usize) -> Result<u16, CoreError> {
    LeBytes::new(buffer).read_u16(offset_from(buffer, record_base, CHECKSUM_OFFSET)?)
}

/// Item security key for the block whose section 0 starts at `section0_base`.
///
/// Ruby/Sapphire has no key and always yields 0 without touching the buffer.
pub fn security_key(
    buffer: &[u8],
    variant: Gen3Variant,
    section0_base: usize,
) -> Result<u32, CoreError> {
    match variant.security_key_offset() {
        None => Ok(0),
        Some(offset) => LeBytes::new(buffer).read_u32(offset_from(buffer, section0_base, offset)?),
    }
}

pub fn decrypt_item_quantity(stored: u16, variant: Gen3Variant, key: u32) -> u16 {
    match variant {
        Gen3Variant::RubySapphire => stored,
        Gen3Variant::Emerald | Gen3Variant::FireRedLeafGreen => stored ^ (key as u16),
    }
}

pub fn encrypt_item_quantity(quantity: u16, variant: Gen3Variant, key: u32) -> u16 {
    decrypt_item_quantity(quantity, variant, key)
}
