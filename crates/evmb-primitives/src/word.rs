//! 256-bit word and its conversions to the fixed-size byte types

use crate::{Address, H256};

/// 256-bit unsigned integer with wrapping arithmetic
pub type Word = primitive_types::U256;

/// Big-endian bytes of a word as a hash
pub fn word_to_h256(value: Word) -> H256 {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    H256::from_bytes(bytes)
}

/// Interpret a hash as a big-endian word
pub fn h256_to_word(value: &H256) -> Word {
    Word::from_big_endian(value.as_bytes())
}

/// Low 20 bytes of a word
pub fn word_to_address(value: Word) -> Address {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes[12..]);
    Address::from_bytes(addr)
}

/// Zero-extend an address to a word
pub fn address_to_word(address: &Address) -> Word {
    Word::from_big_endian(address.as_bytes())
}
