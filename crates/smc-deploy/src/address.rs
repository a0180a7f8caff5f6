//! Contract creation address derivation.
//!
//! The address of a contract created by a plain (non `CREATE2`) transaction is
//! the low 20 bytes of `keccak256(rlp([sender, nonce]))`. The encoding has to
//! match the one used for signing transactions bit for bit, otherwise the
//! derived address silently diverges from the deployed one.

use alloy::{
    primitives::{Address, keccak256},
    rlp::{Encodable, Header},
};

const ADDRESS_LEN: usize = 20;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidAddress {
    #[error("address is not valid hex: {0}")]
    Hex(#[from] const_hex::FromHexError),
    #[error("address must be 20 bytes but is {0}")]
    Length(usize),
}

/// Converts a textual address (with or without `0x` prefix, any casing) into
/// its canonical 20 byte form.
pub fn to_canonical_address(address: &str) -> Result<Address, InvalidAddress> {
    let address = address.trim();
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let bytes = const_hex::decode(digits)?;
    canonical_bytes(&bytes)
}

/// Computes the address of the contract created by `sender` with the
/// transaction using `nonce`.
pub fn derive_address(sender: impl AsRef<[u8]>, nonce: u64) -> Result<Address, InvalidAddress> {
    let sender = canonical_bytes(sender.as_ref())?;
    Ok(contract_address(&sender, nonce))
}

/// Same as [`derive_address`] for an already canonical sender.
pub fn contract_address(sender: &Address, nonce: u64) -> Address {
    let payload_length = sender.length() + nonce.length();
    let mut encoded = Vec::with_capacity(payload_length + 1);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut encoded);
    sender.encode(&mut encoded);
    nonce.encode(&mut encoded);

    let digest = keccak256(&encoded);
    Address::from_slice(&digest[12..])
}

fn canonical_bytes(bytes: &[u8]) -> Result<Address, InvalidAddress> {
    if bytes.len() != ADDRESS_LEN {
        return Err(InvalidAddress::Length(bytes.len()));
    }
    Ok(Address::from_slice(bytes))
}
