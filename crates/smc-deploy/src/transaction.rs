//! Construction of the funding and deployment transactions.
//!
//! The deployment transaction is never signed with a real key. It carries the
//! [`DeterministicTestIdentity`] signature instead, and the sender is whatever
//! account recovers from that signature. This gives reproducible deployer and
//! contract addresses for a fixed payload and gas price, at the cost of the
//! account being unknown until the transaction is built. The identity exists
//! for test networks only and must not be used outside of the bootstrap flow.

use {
    crate::address,
    alloy::{
        consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy},
        eips::eip2718::Encodable2718,
        network::TxSigner,
        primitives::{Address, Bytes, Signature, SignatureError, TxHash, TxKind, U256, uint},
    },
};

/// Gas limit of the contract creation transaction.
pub const DEPLOYMENT_GAS_LIMIT: u64 = 3_000_000;

/// Gas limit of the transaction funding the deployer.
pub const FUNDING_GAS_LIMIT: u64 = 500_000;

/// Fixed `(v, r, s)` triple used to sign the deployment transaction on test
/// networks. Test-only: the recovered sender is an account nobody holds the key
/// for, so it can only ever send the one transaction it was funded for.
pub struct DeterministicTestIdentity;

impl DeterministicTestIdentity {
    pub const V: u64 = 27;
    pub const R: U256 =
        uint!(1000000000000000000000000000000000000000000000000000000000000000000000000000_U256);
    pub const S: U256 =
        uint!(1000000000000000000000000000000000000000000000000000000000000000000000000000_U256);

    pub fn signature() -> Signature {
        // Pre EIP-155 `v` encodes the y parity as 27 or 28.
        Signature::new(Self::R, Self::S, Self::V == 28)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("failed to recover transaction sender: {0}")]
    SenderRecovery(#[from] SignatureError),
    #[error("failed to sign transaction: {0}")]
    Signing(#[from] alloy::signers::Error),
}

/// Contract creation transaction signed with the [`DeterministicTestIdentity`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentTransaction {
    signed: Signed<TxLegacy>,
    sender: Address,
}

impl DeploymentTransaction {
    pub fn tx(&self) -> &TxLegacy {
        self.signed.tx()
    }

    pub fn signature(&self) -> &Signature {
        self.signed.signature()
    }

    /// Account the deployment is sent from, as recovered from the fixed
    /// signature.
    pub fn sender(&self) -> Address {
        self.sender
    }

    pub fn hash(&self) -> TxHash {
        *self.signed.hash()
    }

    pub fn raw(&self) -> Bytes {
        raw_transaction(&self.signed)
    }

    /// Address the contract will be deployed at.
    pub fn contract_address(&self) -> Address {
        address::contract_address(&self.sender, self.tx().nonce)
    }

    /// Amount of native currency the sender needs to pay for this transaction.
    pub fn funding_amount(&self) -> U256 {
        let tx = self.tx();
        U256::from(tx.gas_limit) * U256::from(tx.gas_price) + tx.value
    }
}

/// Builds the contract creation transaction with `bytecode || encoded_args` as
/// init code.
///
/// The result only depends on the inputs: building twice yields byte identical
/// transactions with the same sender.
pub fn build_deployment_tx(
    bytecode: &[u8],
    encoded_args: &[u8],
    gas_price: u128,
) -> Result<DeploymentTransaction, TransactionError> {
    let input = [bytecode, encoded_args].concat();
    let tx = TxLegacy {
        chain_id: None,
        nonce: 0,
        gas_price,
        gas_limit: DEPLOYMENT_GAS_LIMIT,
        to: TxKind::Create,
        value: U256::ZERO,
        input: input.into(),
    };
    let signed = tx.into_signed(DeterministicTestIdentity::signature());
    let sender = signed
        .signature()
        .recover_address_from_prehash(&signed.signature_hash())?;
    Ok(DeploymentTransaction { signed, sender })
}

/// Unsigned transaction paying the deployment's costs to its sender.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundingTransaction(TxLegacy);

impl FundingTransaction {
    pub fn tx(&self) -> &TxLegacy {
        &self.0
    }

    pub fn recipient(&self) -> Option<Address> {
        self.0.to.to().copied()
    }

    pub fn value(&self) -> U256 {
        self.0.value
    }

    pub async fn sign(
        self,
        signer: &(dyn TxSigner<Signature> + Send + Sync),
    ) -> Result<Signed<TxLegacy>, TransactionError> {
        let mut tx = self.0;
        let signature = signer.sign_transaction(&mut tx).await?;
        Ok(tx.into_signed(signature))
    }
}

pub fn build_funding_tx(
    funding_account_nonce: u64,
    gas_price: u128,
    deployment_tx: &DeploymentTransaction,
) -> FundingTransaction {
    FundingTransaction(TxLegacy {
        chain_id: None,
        nonce: funding_account_nonce,
        gas_price,
        gas_limit: FUNDING_GAS_LIMIT,
        to: TxKind::Call(deployment_tx.sender()),
        value: deployment_tx.funding_amount(),
        input: Bytes::new(),
    })
}

/// Network encoding of a signed transaction as accepted by
/// `eth_sendRawTransaction`.
pub fn raw_transaction(signed: &Signed<TxLegacy>) -> Bytes {
    TxEnvelope::from(signed.clone()).encoded_2718().into()
}
