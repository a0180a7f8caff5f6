//! Node operations needed by the deployment flow.
//!
//! The trait abstracts the node so the flow can be tested against mocks.

use {
    alloy::{
        network::ReceiptResponse,
        primitives::{Address, Bytes, TxHash},
        providers::{DynProvider, Provider, ProviderBuilder, ext::AnvilApi},
        rpc::{client::ClientBuilder, types::TransactionReceipt},
    },
    anyhow::{Context, Result},
    url::Url,
};

/// Inclusion record of a mined transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// Whether execution succeeded.
    pub status: bool,
    /// Address of the created contract as reported by the node.
    pub contract_address: Option<Address>,
}

impl From<TransactionReceipt> for Receipt {
    fn from(receipt: TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            status: receipt.status(),
            contract_address: receipt.contract_address(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Number of transactions mined for the account so far.
    async fn get_account_nonce(&self, account: Address) -> Result<u64>;

    async fn submit_raw_transaction(&self, raw: Bytes) -> Result<TxHash>;

    /// Mines `blocks` new blocks. Only supported by development nodes.
    async fn advance_chain(&self, blocks: u64) -> Result<()>;

    /// Returns `None` while the transaction is not part of a block.
    async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>>;
}

/// [`ChainClient`] talking JSON RPC to a development node such as anvil.
#[derive(Debug, Clone)]
pub struct NodeClient {
    provider: DynProvider,
}

impl NodeClient {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }

    pub fn from_url(url: &Url) -> Self {
        let rpc = ClientBuilder::default().http(url.clone());
        Self::new(ProviderBuilder::new().connect_client(rpc).erased())
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait::async_trait]
impl ChainClient for NodeClient {
    async fn get_account_nonce(&self, account: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(account)
            .await
            .with_context(|| format!("could not get nonce of {account}"))
    }

    async fn submit_raw_transaction(&self, raw: Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .context("node rejected raw transaction")?;
        Ok(*pending.tx_hash())
    }

    async fn advance_chain(&self, blocks: u64) -> Result<()> {
        for _ in 0..blocks {
            self.provider
                .evm_mine(None)
                .await
                .context("could not mine block")?;
        }
        Ok(())
    }

    async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .with_context(|| format!("could not fetch receipt of {hash}"))?;
        Ok(receipt.map(Receipt::from))
    }
}
