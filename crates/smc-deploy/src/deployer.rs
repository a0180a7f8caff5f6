//! Funds the deterministic deployer account and deploys the sharding manager
//! contract with it.
//!
//! The flow is strictly sequential. The deployment is only submitted once the
//! funding transaction has a receipt, otherwise the deployer could end up
//! without the balance to ever get its transaction mined. Every step is tried
//! exactly once and failures are returned to the caller, which owns any retry
//! policy. A failure after funding leaves the funds with the deployer.

use {
    crate::{
        chain::{ChainClient, Receipt},
        config::Configuration,
        encoding::{self, EncodingError},
        transaction::{self, DeploymentTransaction, TransactionError},
    },
    alloy::{
        network::TxSigner,
        primitives::{Address, Bytes, Signature, TxHash},
    },
    std::{fmt, sync::Arc},
};

/// Blocks mined after each submission before looking for its receipt.
const CONFIRMATION_BLOCKS: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Init,
    Funded,
    Deployed,
    Done,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Init => "init",
            State::Funded => "funded",
            State::Deployed => "deployed",
            State::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    /// The transaction submitted while in `state` had no receipt after mining.
    #[error("transaction {tx_hash} submitted in state {state} was not confirmed")]
    Confirmation { state: State, tx_hash: TxHash },
    #[error("chain request failed in state {state}")]
    Chain {
        state: State,
        #[source]
        source: anyhow::Error,
    },
}

impl DeployError {
    /// State the flow was in when it failed.
    pub fn state(&self) -> State {
        match self {
            Self::Encoding(_) | Self::Transaction(_) => State::Init,
            Self::Confirmation { state, .. } | Self::Chain { state, .. } => *state,
        }
    }
}

/// Outcome of a successful deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deployment {
    /// Derived address of the deployed contract.
    pub contract: Address,
    /// Deterministic account that sent the deployment.
    pub deployer: Address,
    pub funding: Receipt,
    pub deployment: Receipt,
}

pub struct Deployer {
    chain: Arc<dyn ChainClient>,
    funder: Arc<dyn TxSigner<Signature> + Send + Sync>,
    gas_price: u128,
}

impl Deployer {
    /// `funder` pays for the deployment and signs the funding transaction.
    pub fn new(
        chain: Arc<dyn ChainClient>,
        funder: Arc<dyn TxSigner<Signature> + Send + Sync>,
        gas_price: u128,
    ) -> Self {
        Self {
            chain,
            funder,
            gas_price,
        }
    }

    /// Deploys `bytecode` with `config` as constructor arguments.
    pub async fn deploy(
        &self,
        bytecode: &[u8],
        config: &Configuration,
    ) -> Result<Deployment, DeployError> {
        let arguments = encoding::constructor_arguments(config)?;
        let deployment_tx = transaction::build_deployment_tx(bytecode, &arguments, self.gas_price)?;
        tracing::debug!(
            deployer = ?deployment_tx.sender(),
            contract = ?deployment_tx.contract_address(),
            "built deployment transaction"
        );

        let funding = self.fund(&deployment_tx).await?;
        tracing::info!(
            state = %State::Funded,
            tx = ?funding.transaction_hash,
            "deployer funded"
        );

        let deployment = self.confirm(State::Funded, deployment_tx.raw()).await?;
        tracing::info!(
            state = %State::Deployed,
            tx = ?deployment.transaction_hash,
            "contract deployed"
        );

        let contract = deployment_tx.contract_address();
        match deployment.contract_address {
            Some(reported) if reported != contract => tracing::warn!(
                ?reported,
                derived = ?contract,
                "node reports a different contract address"
            ),
            _ => (),
        }
        tracing::info!(state = %State::Done, ?contract, "deployment finished");

        Ok(Deployment {
            contract,
            deployer: deployment_tx.sender(),
            funding,
            deployment,
        })
    }

    /// `Init -> Funded`
    async fn fund(&self, deployment_tx: &DeploymentTransaction) -> Result<Receipt, DeployError> {
        let chain_error = |source| DeployError::Chain {
            state: State::Init,
            source,
        };

        let funder = self.funder.address();
        let nonce = self
            .chain
            .get_account_nonce(funder)
            .await
            .map_err(chain_error)?;
        let funding_tx = transaction::build_funding_tx(nonce, self.gas_price, deployment_tx);
        tracing::debug!(?funder, nonce, value = %funding_tx.value(), "funding deployer");

        let signed = funding_tx.sign(self.funder.as_ref()).await?;
        self.confirm(State::Init, transaction::raw_transaction(&signed))
            .await
    }

    /// Submits `raw`, mines and checks for a receipt. `state` is the state the
    /// flow is in before the transition.
    async fn confirm(&self, state: State, raw: Bytes) -> Result<Receipt, DeployError> {
        let chain_error = |source| DeployError::Chain { state, source };

        tracing::debug!(%state, len = raw.len(), "submitting raw transaction");
        let tx_hash = self
            .chain
            .submit_raw_transaction(raw)
            .await
            .map_err(chain_error)?;
        self.chain
            .advance_chain(CONFIRMATION_BLOCKS)
            .await
            .map_err(chain_error)?;
        let receipt = self
            .chain
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(chain_error)?
            .ok_or(DeployError::Confirmation { state, tx_hash })?;

        if !receipt.status {
            tracing::warn!(%state, ?tx_hash, "transaction was mined but reverted");
        }
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            address::derive_address,
            chain::MockChainClient,
            transaction::{DEPLOYMENT_GAS_LIMIT, FUNDING_GAS_LIMIT},
        },
        alloy::{
            consensus::{Signed, TxEnvelope, TxLegacy},
            eips::eip2718::Decodable2718,
            primitives::{B256, TxKind, U256},
            signers::local::PrivateKeySigner,
        },
        anyhow::anyhow,
        mockall::{Sequence, predicate::eq},
    };

    const GAS_PRICE: u128 = 2;
    const FUNDER_NONCE: u64 = 9;

    fn funder() -> Arc<PrivateKeySigner> {
        Arc::new(PrivateKeySigner::from_bytes(&B256::repeat_byte(0x42)).unwrap())
    }

    fn decode(raw: &Bytes) -> Signed<TxLegacy> {
        match TxEnvelope::decode_2718(&mut &raw[..]).unwrap() {
            TxEnvelope::Legacy(signed) => signed,
            other => panic!("unexpected transaction type {other:?}"),
        }
    }

    fn signer_of(signed: &Signed<TxLegacy>) -> Address {
        signed
            .signature()
            .recover_address_from_prehash(&signed.signature_hash())
            .unwrap()
    }

    fn receipt(tx_hash: TxHash) -> Receipt {
        Receipt {
            transaction_hash: tx_hash,
            block_number: Some(1),
            status: true,
            contract_address: None,
        }
    }

    fn expected_deployment() -> DeploymentTransaction {
        let arguments = encoding::constructor_arguments(&Configuration::testing()).unwrap();
        transaction::build_deployment_tx(&[], &arguments, GAS_PRICE).unwrap()
    }

    #[tokio::test]
    async fn funds_then_deploys() {
        observe::tracing::initialize_reentrant("smc_deploy=debug");

        let funder = funder();
        let funder_address = funder.address();
        let expected = expected_deployment();
        let deployer_address = expected.sender();
        let funding_hash = TxHash::repeat_byte(1);
        let deployment_hash = TxHash::repeat_byte(2);

        let mut chain = MockChainClient::new();
        let mut seq = Sequence::new();
        chain
            .expect_get_account_nonce()
            .with(eq(funder_address))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(FUNDER_NONCE));
        chain
            .expect_submit_raw_transaction()
            .withf(move |raw| {
                let signed = decode(raw);
                let tx = signed.tx();
                tx.to == TxKind::Call(deployer_address)
                    && tx.value == U256::from(DEPLOYMENT_GAS_LIMIT) * U256::from(GAS_PRICE)
                    && tx.nonce == FUNDER_NONCE
                    && tx.gas_limit == FUNDING_GAS_LIMIT
                    && tx.input.is_empty()
                    && signer_of(&signed) == funder_address
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(funding_hash));
        chain
            .expect_advance_chain()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        chain
            .expect_get_transaction_receipt()
            .with(eq(funding_hash))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(Some(receipt(hash))));
        let raw_deployment = expected.raw();
        chain
            .expect_submit_raw_transaction()
            .withf(move |raw| *raw == raw_deployment)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(deployment_hash));
        chain
            .expect_advance_chain()
            .with(eq(1))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        chain
            .expect_get_transaction_receipt()
            .with(eq(deployment_hash))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|hash| Ok(Some(receipt(hash))));

        let deployer = Deployer::new(Arc::new(chain), funder, GAS_PRICE);
        let deployment = deployer
            .deploy(&[], &Configuration::testing())
            .await
            .unwrap();

        assert_eq!(deployment.deployer, deployer_address);
        assert_eq!(
            deployment.contract,
            derive_address(deployer_address, 0).unwrap()
        );
        assert_eq!(deployment.funding.transaction_hash, funding_hash);
        assert_eq!(deployment.deployment.transaction_hash, deployment_hash);
    }

    #[tokio::test]
    async fn stops_when_funding_is_not_confirmed() {
        let funding_hash = TxHash::repeat_byte(1);

        let mut chain = MockChainClient::new();
        chain
            .expect_get_account_nonce()
            .returning(|_| Ok(FUNDER_NONCE));
        // Only the funding transaction may ever be submitted.
        chain
            .expect_submit_raw_transaction()
            .times(1)
            .returning(move |_| Ok(funding_hash));
        chain
            .expect_advance_chain()
            .times(1)
            .returning(|_| Ok(()));
        chain
            .expect_get_transaction_receipt()
            .times(1)
            .returning(|_| Ok(None));

        let deployer = Deployer::new(Arc::new(chain), funder(), GAS_PRICE);
        let err = deployer
            .deploy(&[], &Configuration::testing())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DeployError::Confirmation {
                state: State::Init,
                tx_hash,
            } if tx_hash == funding_hash
        ));
        assert_eq!(err.state(), State::Init);
    }

    #[tokio::test]
    async fn reports_unconfirmed_deployment() {
        let deployment_hash = TxHash::repeat_byte(2);

        let mut chain = MockChainClient::new();
        chain
            .expect_get_account_nonce()
            .returning(|_| Ok(FUNDER_NONCE));
        let raw_deployment = expected_deployment().raw();
        let mut seq = Sequence::new();
        chain
            .expect_submit_raw_transaction()
            .withf({
                let raw_deployment = raw_deployment.clone();
                move |raw| *raw != raw_deployment
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(TxHash::repeat_byte(1)));
        chain
            .expect_submit_raw_transaction()
            .withf(move |raw| *raw == raw_deployment)
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(deployment_hash));
        chain
            .expect_advance_chain()
            .times(2)
            .returning(|_| Ok(()));
        chain
            .expect_get_transaction_receipt()
            .returning(move |hash| Ok((hash != deployment_hash).then(|| receipt(hash))));

        let deployer = Deployer::new(Arc::new(chain), funder(), GAS_PRICE);
        let err = deployer
            .deploy(&[], &Configuration::testing())
            .await
            .unwrap_err();

        assert_eq!(err.state(), State::Funded);
        assert!(matches!(err, DeployError::Confirmation { .. }));
    }

    #[tokio::test]
    async fn rejects_invalid_configuration_before_touching_the_chain() {
        let config = Configuration {
            committee_size: num::BigInt::from(-5),
            ..Configuration::testing()
        };

        // No expectations: any chain call fails the test.
        let chain = MockChainClient::new();
        let deployer = Deployer::new(Arc::new(chain), funder(), GAS_PRICE);
        let err = deployer.deploy(&[], &config).await.unwrap_err();

        assert!(matches!(
            err,
            DeployError::Encoding(EncodingError::Negative {
                name: "committee_size",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn surfaces_chain_errors_with_state() {
        let mut chain = MockChainClient::new();
        chain
            .expect_get_account_nonce()
            .returning(|_| Err(anyhow!("connection refused")));

        let deployer = Deployer::new(Arc::new(chain), funder(), GAS_PRICE);
        let err = deployer
            .deploy(&[], &Configuration::testing())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DeployError::Chain {
                state: State::Init,
                ..
            }
        ));
    }
}
