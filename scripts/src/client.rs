//! The chain client used by the deploy scripts, and its RPC implementation

use alloy::{
    network::TransactionBuilder,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use tracing::{debug, info};

use crate::{config::DeployConfig, errors::ScriptError, types::TxOutcome};

/// The operations the deploy scripts need from a chain.
///
/// Every state-changing method returns only once the transaction is
/// confirmed, and fails if it reverted.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The address that signs and pays for every transaction
    fn deployer(&self) -> Address;

    /// The native-token balance of `address`, in wei
    async fn get_balance(&self, address: Address) -> Result<U256, ScriptError>;

    /// Send a contract creation transaction with the given init code
    async fn deploy(&self, init_code: Bytes) -> Result<TxOutcome, ScriptError>;

    /// Send a transaction calling `to` with `calldata`
    async fn call(&self, to: Address, calldata: Bytes) -> Result<TxOutcome, ScriptError>;

    /// Read a raw storage slot of `address`
    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError>;
}

/// A [`ChainClient`] speaking JSON-RPC through an alloy provider
pub struct RpcChainClient {
    /// The type-erased provider, with the deployer's wallet attached
    provider: DynProvider,
    /// The deployer address
    deployer: Address,
    /// Number of confirmations to wait for on each transaction
    confirmations: u64,
}

impl RpcChainClient {
    /// Sets up the provider with which to send transactions, from the
    /// configured private key and RPC url
    pub async fn connect(config: &DeployConfig) -> Result<Self, ScriptError> {
        let deployer = config.signer.address();
        let provider = ProviderBuilder::new()
            .wallet(config.signer.clone())
            .connect_http(config.rpc_url.clone())
            .erased();

        // Surface a bad endpoint before the run starts
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        info!(chain_id, deployer = %deployer, "connected to {}", config.rpc_url);

        Ok(Self {
            provider,
            deployer,
            confirmations: config.confirmations,
        })
    }

    /// Send a transaction and wait for a successful receipt
    async fn send(&self, tx: TransactionRequest, label: &str) -> Result<TxOutcome, ScriptError> {
        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractInteraction(format!("{label}: {e}")))?;
        info!(tx_hash = %pending_tx.tx_hash(), "sent {label} transaction");

        let receipt = pending_tx
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractInteraction(format!("{label}: {e}")))?;

        outcome_from_receipt(&receipt, label)
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    fn deployer(&self) -> Address {
        self.deployer
    }

    async fn get_balance(&self, address: Address) -> Result<U256, ScriptError> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    async fn deploy(&self, init_code: Bytes) -> Result<TxOutcome, ScriptError> {
        debug!(init_code_len = init_code.len(), "deploying contract");
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_deploy_code(init_code);

        self.send(tx, "deployment").await.map_err(deployment_error)
    }

    async fn call(&self, to: Address, calldata: Bytes) -> Result<TxOutcome, ScriptError> {
        debug!(to = %to, calldata_len = calldata.len(), "calling contract");
        let tx = TransactionRequest::default()
            .with_from(self.deployer)
            .with_to(to)
            .with_input(calldata);

        self.send(tx, "call").await
    }

    async fn get_storage_at(&self, address: Address, slot: B256) -> Result<B256, ScriptError> {
        let value = self
            .provider
            .get_storage_at(address, U256::from_be_bytes(slot.0))
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Ok(B256::from(value.to_be_bytes::<32>()))
    }
}

/// Report transport failures of a creation transaction as deployment errors
fn deployment_error(e: ScriptError) -> ScriptError {
    match e {
        ScriptError::ContractInteraction(s) => ScriptError::ContractDeployment(s),
        e => e,
    }
}

/// Convert a receipt into a [`TxOutcome`], failing on reverts
fn outcome_from_receipt(
    receipt: &TransactionReceipt,
    label: &str,
) -> Result<TxOutcome, ScriptError> {
    if !receipt.status() {
        return Err(ScriptError::TransactionReverted(format!(
            "{label} {:#x}",
            receipt.transaction_hash
        )));
    }

    let outcome = TxOutcome {
        tx_hash: receipt.transaction_hash,
        contract_address: receipt.contract_address,
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
    };
    info!(
        tx_hash = %outcome.tx_hash,
        gas_used = outcome.gas_used,
        fee = %outcome.fee(),
        "{label} confirmed"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use alloy::rpc::types::TransactionReceipt;
    use alloy_primitives::{address, b256, Address, B256};

    use super::{deployment_error, outcome_from_receipt};
    use crate::errors::ScriptError;

    /// The hash of the test transaction
    const TX_HASH: B256 =
        b256!("0xabababababababababababababababababababababababababababababababab");

    /// The contract created by the test transaction
    const CREATED: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    /// A creation receipt as returned by `eth_getTransactionReceipt`
    fn creation_receipt(status: &str) -> TransactionReceipt {
        let json = serde_json::json!({
            "type": "0x2",
            "status": status,
            "transactionHash": TX_HASH,
            "transactionIndex": "0x0",
            "blockHash": B256::repeat_byte(0x11),
            "blockNumber": "0x1",
            "from": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
            "to": null,
            "contractAddress": CREATED,
            "cumulativeGasUsed": "0x186a0",
            "gasUsed": "0x186a0",
            "effectiveGasPrice": "0x3b9aca00",
            "logs": [],
            "logsBloom": format!("0x{}", "00".repeat(256)),
        });
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_successful_receipt() {
        let outcome = outcome_from_receipt(&creation_receipt("0x1"), "deployment").unwrap();

        assert_eq!(outcome.tx_hash, TX_HASH);
        assert_eq!(outcome.contract_address, Some(CREATED));
        assert_eq!(outcome.gas_used, 100_000);
        assert_eq!(outcome.effective_gas_price, 1_000_000_000);
        assert_eq!(outcome.fee().to::<u128>(), 100_000_000_000_000);
    }

    #[test]
    fn test_reverted_receipt() {
        let res = outcome_from_receipt(&creation_receipt("0x0"), "call");
        match res {
            Err(ScriptError::TransactionReverted(msg)) => {
                assert!(msg.starts_with("call "));
                assert!(msg.contains(&format!("{TX_HASH:#x}")));
            }
            other => panic!("expected a revert, got {other:?}"),
        }
    }

    #[test]
    fn test_deployment_error_remap() {
        let res = deployment_error(ScriptError::ContractInteraction("nonce too low".to_string()));
        assert!(matches!(res, ScriptError::ContractDeployment(s) if s == "nonce too low"));

        // Reverts stay reverts
        let res = deployment_error(ScriptError::TransactionReverted("0x01".to_string()));
        assert!(matches!(res, ScriptError::TransactionReverted(_)));
    }
}
