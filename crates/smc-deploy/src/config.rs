use {
    anyhow::anyhow,
    num::BigInt,
    serde::{Deserialize, Serialize},
    std::path::Path,
};

/// System parameters passed to the sharding manager contract constructor.
///
/// Values are kept unbounded so that out of range parameters are reported by
/// the argument encoder instead of being silently truncated while loading.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Configuration {
    #[serde(with = "crate::serialization")]
    pub shard_count: BigInt,
    /// Number of blocks in one period.
    #[serde(with = "crate::serialization")]
    pub period_length: BigInt,
    /// Number of periods ahead of the current one for which notaries are
    /// sampled.
    #[serde(with = "crate::serialization")]
    pub lookahead_periods: BigInt,
    #[serde(with = "crate::serialization")]
    pub committee_size: BigInt,
    #[serde(with = "crate::serialization")]
    pub quorum_size: BigInt,
    /// Deposit required to register as a notary, in wei.
    #[serde(with = "crate::serialization")]
    pub notary_deposit: BigInt,
    /// Number of periods a deregistered notary's deposit stays locked.
    #[serde(with = "crate::serialization")]
    pub notary_lockup_length: BigInt,
}

impl Configuration {
    /// Parameters used by the test harness.
    pub fn testing() -> Self {
        Self {
            shard_count: BigInt::from(100),
            period_length: BigInt::from(5),
            lookahead_periods: BigInt::from(4),
            committee_size: BigInt::from(135),
            quorum_size: BigInt::from(90),
            notary_deposit: BigInt::from(1_000) * BigInt::from(10).pow(18),
            notary_lockup_length: BigInt::from(120),
        }
    }

    /// Named parameters in constructor argument order. The order is part of
    /// the contract's binary interface.
    pub fn parameters(&self) -> [(&'static str, &BigInt); 7] {
        [
            ("shard_count", &self.shard_count),
            ("period_length", &self.period_length),
            ("lookahead_periods", &self.lookahead_periods),
            ("committee_size", &self.committee_size),
            ("quorum_size", &self.quorum_size),
            ("notary_deposit", &self.notary_deposit),
            ("notary_lockup_length", &self.notary_lockup_length),
        ]
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        match toml::from_str(&tokio::fs::read_to_string(&path).await?) {
            Ok(self_) => Ok(self_),
            Err(err) if std::env::var("TOML_TRACE_ERROR").is_ok_and(|v| v == "1") => Err(anyhow!(
                "failed to parse TOML config at {}: {err:#?}",
                path.as_ref().display()
            )),
            Err(_) => Err(anyhow!(
                "failed to parse TOML config at: {}. Set TOML_TRACE_ERROR=1 to print parsing \
                 error.",
                path.as_ref().display()
            )),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::testing()
    }
}
