//! The deployment pipeline: deploy every game contract, then grant game owner
//! rights between them.
//!
//! Each step is awaited to confirmation before the next one is issued, so the
//! deployer's nonce is never contended. Any error aborts the run; contracts
//! that were already deployed stay on-chain and in the deployments file.

use std::{collections::HashMap, io::Write};

use alloy_primitives::{Address, Bytes, U256};
use itertools::Itertools;
use tracing::{info, warn};

use crate::{
    artifacts::{Artifact, ArtifactStore},
    client::ChainClient,
    constants::{NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT, PROXY_ADMIN_STORAGE_SLOT},
    deployments::DeploymentsFile,
    errors::ScriptError,
    report::Report,
    solidity::{
        add_game_owner_batch_calldata, create_account_constructor_args, game_initialize_calldata,
        proxy_constructor_args, sync_initialize_calldata,
    },
    types::{
        AuthorizationGrant, DeployedContract, DeployedContracts, DeploymentKind, GameContract,
        RunSummary, TxOutcome,
    },
};

/// Runs a single deployment against a [`ChainClient`]
pub struct Orchestrator<'a, C: ChainClient, W: Write> {
    /// The chain to deploy to
    client: &'a C,
    /// Where deployed addresses are recorded
    deployments: &'a DeploymentsFile,
    /// The server signer passed to the sync and account creation contracts
    server_signer: Address,
    /// The `TransparentUpgradeableProxy` artifact
    proxy_artifact: Artifact,
    /// The artifact of every game contract
    artifacts: HashMap<GameContract, Artifact>,
    /// The console report
    report: Report<W>,
    /// Fees reported by the receipts of this run
    receipt_fees: U256,
    /// Number of transactions sent in this run
    num_transactions: usize,
}

impl<'a, C: ChainClient, W: Write> Orchestrator<'a, C, W> {
    /// Create an orchestrator, loading every artifact up front so that a
    /// missing one fails the run before anything is sent
    pub fn new(
        client: &'a C,
        artifact_store: &ArtifactStore,
        deployments: &'a DeploymentsFile,
        server_signer: Address,
        out: W,
    ) -> Result<Self, ScriptError> {
        let proxy_artifact = artifact_store.load_proxy()?;
        let mut artifacts = HashMap::new();
        for contract in GameContract::DEPLOYMENT_ORDER {
            artifacts.insert(contract, artifact_store.load(contract.artifact_name())?);
        }

        Ok(Self {
            client,
            deployments,
            server_signer,
            proxy_artifact,
            artifacts,
            report: Report::new(out),
            receipt_fees: U256::ZERO,
            num_transactions: 0,
        })
    }

    /// Run the full deployment
    pub async fn run(mut self) -> Result<RunSummary, ScriptError> {
        let (deployer, begin_balance) = self.resolve_deployer().await?;

        let contracts = self.deploy_all().await?;
        self.grant_authorizations(&contracts).await?;

        let (end_balance, fee_spent) = self.report_cost(deployer, begin_balance).await?;

        Ok(RunSummary {
            deployer,
            contracts,
            begin_balance,
            end_balance,
            fee_spent,
            receipt_fees: self.receipt_fees,
            num_transactions: self.num_transactions,
        })
    }

    // ---------
    // | Steps |
    // ---------

    /// Read the deployer and its starting balance
    async fn resolve_deployer(&mut self) -> Result<(Address, U256), ScriptError> {
        let deployer = self.client.deployer();
        let balance = self.client.get_balance(deployer).await?;
        self.report.deployer(deployer, balance)?;
        Ok((deployer, balance))
    }

    /// Deploy every contract in order
    async fn deploy_all(&mut self) -> Result<DeployedContracts, ScriptError> {
        let account = self.deploy_simple_upgradeable(GameContract::Account).await?;
        let backpack = self.deploy_simple_upgradeable(GameContract::Backpack).await?;
        let avatar_customization = self
            .deploy_simple_upgradeable(GameContract::AvatarCustomization)
            .await?;
        let inventory = self.deploy_simple_upgradeable(GameContract::Inventory).await?;
        let dust_token = self.deploy_simple_upgradeable(GameContract::DustToken).await?;

        let sync_calldata = sync_initialize_calldata(
            account.address,
            [
                backpack.address,
                avatar_customization.address,
                inventory.address,
            ],
            dust_token.address,
            self.server_signer,
        );
        let sync = self.deploy_proxy(GameContract::Sync, sync_calldata).await?;

        let create_account_args =
            create_account_constructor_args(account.address, self.server_signer);
        let create_account = self
            .deploy_plain(GameContract::CreateAccount, &create_account_args)
            .await?;

        Ok(DeployedContracts {
            account,
            backpack,
            avatar_customization,
            inventory,
            dust_token,
            sync,
            create_account,
        })
    }

    /// Issue every `addGameOwnerBatch` grant
    async fn grant_authorizations(
        &mut self,
        contracts: &DeployedContracts,
    ) -> Result<(), ScriptError> {
        self.report.setting()?;
        for grant in contracts.authorization_grants() {
            self.grant(&grant).await?;
        }

        Ok(())
    }

    /// Re-read the deployer balance and report what the run cost
    async fn report_cost(
        &mut self,
        deployer: Address,
        begin_balance: U256,
    ) -> Result<(U256, U256), ScriptError> {
        let end_balance = self.client.get_balance(deployer).await?;
        let spent = fee_spent(begin_balance, end_balance);
        if spent != self.receipt_fees {
            info!(
                balance_delta = %spent,
                receipt_fees = %self.receipt_fees,
                "balance delta differs from summed receipt fees"
            );
        }

        self.report.cost(end_balance, spent)?;
        Ok((end_balance, spent))
    }

    // -----------
    // | Helpers |
    // -----------

    /// Deploy an upgradeable contract whose initializer takes no arguments
    async fn deploy_simple_upgradeable(
        &mut self,
        contract: GameContract,
    ) -> Result<DeployedContract, ScriptError> {
        self.deploy_proxy(contract, game_initialize_calldata()).await
    }

    /// Deploy the implementation of `contract`, then a transparent proxy
    /// that runs `init_calldata` against it in its constructor.
    ///
    /// Fails if the proxy did not create its own `ProxyAdmin`
    async fn deploy_proxy(
        &mut self,
        contract: GameContract,
        init_calldata: Vec<u8>,
    ) -> Result<DeployedContract, ScriptError> {
        let implementation_code = self.artifact(contract)?.init_code(&[]);
        let implementation = self.deploy_code(contract, implementation_code).await?;

        let proxy_args =
            proxy_constructor_args(implementation, self.client.deployer(), init_calldata);
        let proxy_code = self.proxy_artifact.init_code(&proxy_args);
        let proxy = self.deploy_code(contract, proxy_code).await?;

        // The proxy constructor deploys its own `ProxyAdmin`, whose address is
        // only discoverable through the EIP1967 admin slot:
        // https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106
        let admin_slot = self
            .client
            .get_storage_at(proxy, PROXY_ADMIN_STORAGE_SLOT)
            .await?;
        let proxy_admin = Address::from_slice(
            &admin_slot[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..NUM_BYTES_STORAGE_SLOT],
        );

        // A proxy administered by the deployer itself refuses every call the
        // deployer makes through it, including the grants
        if proxy_admin.is_zero() || proxy_admin == self.client.deployer() {
            return Err(ScriptError::InvalidProxyAdmin(format!(
                "{contract} proxy at {proxy} is administered by {proxy_admin}, \
                 expected a dedicated ProxyAdmin"
            )));
        }

        let deployed = DeployedContract {
            contract,
            address: proxy,
            kind: DeploymentKind::Proxy {
                implementation,
                proxy_admin,
            },
        };
        self.finish_deployment(&deployed)?;
        Ok(deployed)
    }

    /// Deploy `contract` directly with the given encoded constructor arguments
    async fn deploy_plain(
        &mut self,
        contract: GameContract,
        constructor_args: &[u8],
    ) -> Result<DeployedContract, ScriptError> {
        let code = self.artifact(contract)?.init_code(constructor_args);
        let address = self.deploy_code(contract, code).await?;

        let deployed = DeployedContract {
            contract,
            address,
            kind: DeploymentKind::Plain,
        };
        self.finish_deployment(&deployed)?;
        Ok(deployed)
    }

    /// Send a creation transaction, returning the created address
    async fn deploy_code(
        &mut self,
        contract: GameContract,
        init_code: Bytes,
    ) -> Result<Address, ScriptError> {
        let outcome = self.client.deploy(init_code).await?;
        self.track(&outcome);

        outcome
            .contract_address
            .ok_or_else(|| ScriptError::MissingContractAddress(contract.to_string()))
    }

    /// Record and report a confirmed deployment
    fn finish_deployment(&mut self, deployed: &DeployedContract) -> Result<(), ScriptError> {
        info!(contract = %deployed.contract, address = %deployed.address, "deployed");
        self.deployments.record(deployed)?;
        self.report.contract(deployed.contract, deployed.address)
    }

    /// Send a single `addGameOwnerBatch` call and wait for it
    async fn grant(&mut self, grant: &AuthorizationGrant) -> Result<(), ScriptError> {
        let calldata = add_game_owner_batch_calldata(grant.grantees.clone());
        let outcome = self.client.call(grant.target_address, calldata.into()).await?;
        self.track(&outcome);

        info!(
            contract = %grant.target,
            grantees = %grant.grantees.iter().join(", "),
            "granted game owners"
        );
        self.report.granted(grant.target)
    }

    /// The artifact of a game contract
    fn artifact(&self, contract: GameContract) -> Result<&Artifact, ScriptError> {
        self.artifacts.get(&contract).ok_or_else(|| {
            ScriptError::ReadArtifact(format!("artifact for {} not loaded", contract))
        })
    }

    /// Account for a confirmed transaction
    fn track(&mut self, outcome: &TxOutcome) {
        self.receipt_fees += outcome.fee();
        self.num_transactions += 1;
    }
}

/// The fees spent by the run, as seen from the deployer's balance.
///
/// The balance can only grow if the deployer was funded mid-run, in which case
/// the spend is unknowable from balances alone and is reported as zero.
pub fn fee_spent(begin_balance: U256, end_balance: U256) -> U256 {
    if end_balance > begin_balance {
        warn!(
            begin = %begin_balance,
            end = %end_balance,
            "deployer balance grew during the run"
        );
        return U256::ZERO;
    }

    begin_balance - end_balance
}
