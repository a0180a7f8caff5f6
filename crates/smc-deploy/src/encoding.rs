//! ABI encoding of the sharding manager constructor arguments.

use {
    crate::config::Configuration,
    alloy::primitives::{Bytes, U256},
    num::{BigInt, bigint::Sign},
};

/// Size of a single ABI encoded `uint256` word.
pub const WORD_LEN: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodingError {
    #[error("parameter {name} is negative: {value}")]
    Negative { name: &'static str, value: BigInt },
    #[error("parameter {name} does not fit into 256 bits: {value}")]
    TooLarge { name: &'static str, value: BigInt },
}

/// Encodes the configuration as constructor arguments to be appended to the
/// contract init code: every parameter as a 32 byte big endian word, in
/// [`Configuration::parameters`] order.
pub fn constructor_arguments(config: &Configuration) -> Result<Bytes, EncodingError> {
    let parameters = config.parameters();
    let mut encoded = Vec::with_capacity(parameters.len() * WORD_LEN);
    for (name, value) in parameters {
        encoded.extend_from_slice(&to_word(name, value)?.to_be_bytes::<WORD_LEN>());
    }
    Ok(encoded.into())
}

fn to_word(name: &'static str, value: &BigInt) -> Result<U256, EncodingError> {
    let (sign, bytes) = value.to_bytes_be();
    if sign == Sign::Minus {
        return Err(EncodingError::Negative {
            name,
            value: value.clone(),
        });
    }
    if bytes.len() > WORD_LEN {
        return Err(EncodingError::TooLarge {
            name,
            value: value.clone(),
        });
    }
    Ok(U256::from_be_slice(&bytes))
}
