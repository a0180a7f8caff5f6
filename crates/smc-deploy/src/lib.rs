//! Bootstraps the sharding manager contract on a development chain.
//!
//! The contract is deployed from a deterministic, keyless account (see
//! [`transaction::DeterministicTestIdentity`]) which is first funded by a real
//! account. Its address is derived up front and returned once the deployment is
//! confirmed.

pub mod address;
pub mod arguments;
pub mod artifact;
pub mod chain;
pub mod config;
pub mod deployer;
pub mod encoding;
pub mod serialization;
pub mod transaction;

use {
    crate::{artifact::Artifact, chain::NodeClient, config::Configuration, deployer::Deployer},
    anyhow::{Context, Result},
    std::sync::Arc,
};

pub async fn run(args: arguments::Arguments) -> Result<()> {
    let config = match &args.config {
        Some(path) => Configuration::from_path(path).await?,
        None => Configuration::testing(),
    };
    let artifact = Artifact::from_path(&args.artifact).await?;
    let chain = NodeClient::from_url(&args.node_url);

    let deployer = Deployer::new(Arc::new(chain), Arc::new(args.private_key), args.gas_price);
    let deployment = deployer
        .deploy(&artifact.bytecode, &config)
        .await
        .context("sharding manager deployment failed")?;

    tracing::info!(
        contract = ?deployment.contract,
        deployer = ?deployment.deployer,
        "sharding manager contract deployed"
    );
    println!("{}", deployment.contract);
    Ok(())
}
