//! Serde helpers for unbounded integer parameters.
//!
//! TOML integers are limited to `i64`, which is too small for wei amounts such
//! as deposits. Parameters are therefore accepted either as plain integers or
//! as decimal or `0x` prefixed hex strings. Range checks happen later when the
//! values get ABI encoded.

use {
    num::{BigInt, Num},
    serde::{
        Deserializer,
        Serializer,
        de::{self, Visitor},
    },
    std::fmt,
};

pub fn deserialize<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
where
    D: Deserializer<'de>,
{
    struct BigIntVisitor;

    impl Visitor<'_> for BigIntVisitor {
        type Value = BigInt;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(
                formatter,
                "an integer or a string with a decimal or 0x hex prefixed integer"
            )
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.into())
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v.into())
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse(s).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(BigIntVisitor)
}

pub fn serialize<S>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

fn parse(s: &str) -> Result<BigInt, String> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => BigInt::from_str_radix(hex, 16)
            .map_err(|err| format!("failed to decode {s:?} as hex integer: {err}"))?,
        None => BigInt::from_str_radix(digits, 10)
            .map_err(|err| format!("failed to decode {s:?} as decimal integer: {err}"))?,
    };
    Ok(if negative { -magnitude } else { magnitude })
}
