//! Compiled contract artifacts.

use {
    alloy::primitives::Bytes,
    anyhow::{Context, Result, ensure},
    serde::Deserialize,
    std::path::Path,
};

/// The parts of a compiler output JSON file needed for deployment. Other
/// fields (ABI, metadata, ...) are ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Artifact {
    /// Contract init code.
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: Self =
            serde_json::from_str(json).context("contract artifact is not valid JSON")?;
        ensure!(!artifact.bytecode.is_empty(), "contract artifact has no bytecode");
        Ok(artifact)
    }

    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read contract artifact {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid artifact {}", path.display()))
    }
}
