use {
    alloy::signers::local::PrivateKeySigner,
    std::{fmt, path::PathBuf},
    url::Url,
};

#[derive(clap::Parser)]
pub struct Arguments {
    /// The Ethereum node URL to connect to. The node must support `evm_mine`.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// TOML file with the contract constructor parameters. The test harness
    /// parameters are used when omitted.
    #[clap(long, env)]
    pub config: Option<PathBuf>,

    /// Compiled contract JSON containing the init code under `bytecode`.
    #[clap(long, env)]
    pub artifact: PathBuf,

    /// Private key of the account paying for the deployment.
    #[clap(long, env)]
    pub private_key: PrivateKeySigner,

    /// Gas price in wei for both the funding and the deployment transaction.
    #[clap(long, env, default_value = "1000000000")]
    pub gas_price: u128,

    #[clap(long, env, default_value = "warn,smc_deploy=debug")]
    pub log_filter: String,

    /// Emit logs as JSON lines.
    #[clap(long, env)]
    pub use_json_logs: bool,
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "node_url: {}", self.node_url)?;
        writeln!(f, "config: {:?}", self.config)?;
        writeln!(f, "artifact: {}", self.artifact.display())?;
        writeln!(f, "private_key: SECRET ({})", self.private_key.address())?;
        writeln!(f, "gas_price: {}", self.gas_price)?;
        writeln!(f, "log_filter: {}", self.log_filter)?;
        writeln!(f, "use_json_logs: {}", self.use_json_logs)?;
        Ok(())
    }
}
