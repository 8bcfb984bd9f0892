//! Contract address derivation

use crate::keccak256;
use evmb_primitives::{Address, H256};
use rlp::RlpStream;

/// Address of a contract created with CREATE: `keccak(rlp([sender, nonce]))[12..]`
pub fn create_address(sender: &Address, nonce: u64) -> Address {
    let mut stream = RlpStream::new_list(2);
    stream.append(&sender.as_bytes().to_vec());
    stream.append(&nonce);
    let hash = keccak256(&stream.out());
    low_160(&hash)
}

/// Address of a contract created with CREATE2:
/// `keccak(0xff ++ sender ++ salt ++ keccak(init_code))[12..]`
pub fn create2_address(sender: &Address, salt: &H256, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(sender.as_bytes());
    buf.extend_from_slice(salt.as_bytes());
    buf.extend_from_slice(code_hash.as_bytes());
    low_160(&keccak256(&buf))
}

fn low_160(hash: &H256) -> Address {
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_address_known_vectors() {
        let sender = Address::from_hex("0x6ac7ea33f8831ea9dcc53393aaa88b25a785dbf0").unwrap();
        assert_eq!(
            create_address(&sender, 0).to_hex(),
            "0xcd234a471b72ba2f1ccf0a70fcaba648a5eecd8d"
        );
        assert_eq!(
            create_address(&sender, 1).to_hex(),
            "0x343c43a37d37dff08ae8c4a11544c718abb4fcf8"
        );
    }

    #[test]
    fn test_create2_address_eip1014_example() {
        // Example 0 of EIP-1014
        let sender = Address::ZERO;
        let salt = H256::ZERO;
        let init = hex::decode("00").unwrap();
        assert_eq!(
            create2_address(&sender, &salt, &init).to_hex(),
            "0x4d1a2e2bb4f88f0250f26ffff098b0b30b26bf38"
        );
    }

    #[test]
    fn test_create_address_nonce_changes_address() {
        let sender = Address::from_low_u64(1);
        assert_ne!(create_address(&sender, 0), create_address(&sender, 1));
    }
}
