//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy_primitives::{Address, B256, U256};

use crate::constants::{
    ACCOUNT_ARTIFACT, AVATAR_CUSTOMIZATION_ARTIFACT, BACKPACK_ARTIFACT, CREATE_ACCOUNT_ARTIFACT,
    DUST_TOKEN_ARTIFACT, INVENTORY_ARTIFACT, SYNC_ARTIFACT,
};

/// The contracts deployed by the scripts, in deployment order
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GameContract {
    /// The player account contract
    Account,
    /// The backpack item contract
    Backpack,
    /// The avatar customization item contract
    AvatarCustomization,
    /// The inventory item contract
    Inventory,
    /// The star dust ERC20 token
    DustToken,
    /// The game sync contract, which settles server-signed state onto the others
    Sync,
    /// The account creation contract
    CreateAccount,
}

impl GameContract {
    /// Every contract, in deployment order
    pub const DEPLOYMENT_ORDER: [GameContract; 7] = [
        GameContract::Account,
        GameContract::Backpack,
        GameContract::AvatarCustomization,
        GameContract::Inventory,
        GameContract::DustToken,
        GameContract::Sync,
        GameContract::CreateAccount,
    ];

    /// The name of the contract's Hardhat artifact
    pub fn artifact_name(&self) -> &'static str {
        match self {
            GameContract::Account => ACCOUNT_ARTIFACT,
            GameContract::Backpack => BACKPACK_ARTIFACT,
            GameContract::AvatarCustomization => AVATAR_CUSTOMIZATION_ARTIFACT,
            GameContract::Inventory => INVENTORY_ARTIFACT,
            GameContract::DustToken => DUST_TOKEN_ARTIFACT,
            GameContract::Sync => SYNC_ARTIFACT,
            GameContract::CreateAccount => CREATE_ACCOUNT_ARTIFACT,
        }
    }

    /// The key of the contract in the `deployments.json` file
    pub fn deployments_key(&self) -> &'static str {
        match self {
            GameContract::Account => "account_contract",
            GameContract::Backpack => "backpack_contract",
            GameContract::AvatarCustomization => "avatar_customization_contract",
            GameContract::Inventory => "inventory_contract",
            GameContract::DustToken => "dust_token_contract",
            GameContract::Sync => "sync_contract",
            GameContract::CreateAccount => "create_account_contract",
        }
    }
}

impl Display for GameContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameContract::Account => write!(f, "Account"),
            GameContract::Backpack => write!(f, "Backpack"),
            GameContract::AvatarCustomization => write!(f, "AvatarCustomization"),
            GameContract::Inventory => write!(f, "Inventory"),
            GameContract::DustToken => write!(f, "DustToken"),
            GameContract::Sync => write!(f, "Sync"),
            GameContract::CreateAccount => write!(f, "CreateAccount"),
        }
    }
}

/// How a contract was deployed
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DeploymentKind {
    /// Behind a `TransparentUpgradeableProxy`
    Proxy {
        /// The logic contract the proxy delegates to
        implementation: Address,
        /// The `ProxyAdmin` created by the proxy constructor
        proxy_admin: Address,
    },
    /// Directly, via its constructor
    Plain,
}

/// A contract deployed during this run
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DeployedContract {
    /// Which contract this is
    pub contract: GameContract,
    /// The address users interact with, i.e. the proxy for upgradeable contracts
    pub address: Address,
    /// How the contract was deployed
    pub kind: DeploymentKind,
}

/// The full set of contracts deployed by a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedContracts {
    /// The account contract
    pub account: DeployedContract,
    /// The backpack contract
    pub backpack: DeployedContract,
    /// The avatar customization contract
    pub avatar_customization: DeployedContract,
    /// The inventory contract
    pub inventory: DeployedContract,
    /// The dust token contract
    pub dust_token: DeployedContract,
    /// The game sync contract
    pub sync: DeployedContract,
    /// The account creation contract
    pub create_account: DeployedContract,
}

impl DeployedContracts {
    /// The contracts in deployment order
    pub fn in_order(&self) -> [&DeployedContract; 7] {
        [
            &self.account,
            &self.backpack,
            &self.avatar_customization,
            &self.inventory,
            &self.dust_token,
            &self.sync,
            &self.create_account,
        ]
    }

    /// The `addGameOwnerBatch` grants to issue once everything is deployed
    pub fn authorization_grants(&self) -> Vec<AuthorizationGrant> {
        let sync = self.sync.address;
        vec![
            AuthorizationGrant::new(&self.account, vec![self.create_account.address, sync]),
            AuthorizationGrant::new(&self.backpack, vec![sync]),
            AuthorizationGrant::new(&self.avatar_customization, vec![sync]),
            AuthorizationGrant::new(&self.inventory, vec![sync]),
            AuthorizationGrant::new(&self.dust_token, vec![sync]),
        ]
    }
}

/// A call granting the `grantees` game owner rights on the `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant {
    /// The contract on which rights are granted
    pub target: GameContract,
    /// The address of the target contract
    pub target_address: Address,
    /// The addresses that become game owners
    pub grantees: Vec<Address>,
}

impl AuthorizationGrant {
    /// Build a grant on an already-deployed contract
    fn new(target: &DeployedContract, grantees: Vec<Address>) -> Self {
        Self {
            target: target.contract,
            target_address: target.address,
            grantees,
        }
    }
}

/// The result of a confirmed transaction
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TxOutcome {
    /// The transaction hash
    pub tx_hash: B256,
    /// The created contract, for creation transactions
    pub contract_address: Option<Address>,
    /// The gas used by the transaction
    pub gas_used: u64,
    /// The price paid per unit of gas
    pub effective_gas_price: u128,
}

impl TxOutcome {
    /// The fee paid for the transaction, in wei
    pub fn fee(&self) -> U256 {
        U256::from(self.gas_used) * U256::from(self.effective_gas_price)
    }
}

/// The outcome of a full deployment run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The deployer address
    pub deployer: Address,
    /// Every deployed contract
    pub contracts: DeployedContracts,
    /// The deployer balance before the run
    pub begin_balance: U256,
    /// The deployer balance after the run
    pub end_balance: U256,
    /// `begin_balance - end_balance`
    pub fee_spent: U256,
    /// The sum of the fees reported by every receipt in the run
    pub receipt_fees: U256,
    /// The number of transactions sent
    pub num_transactions: usize,
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, U256};

    use super::{DeployedContract, DeployedContracts, DeploymentKind, GameContract, TxOutcome};

    /// Build a deployed contract set with addresses 1..=7 in deployment order
    fn deployed() -> DeployedContracts {
        let c = |contract, byte| DeployedContract {
            contract,
            address: Address::with_last_byte(byte),
            kind: DeploymentKind::Plain,
        };
        DeployedContracts {
            account: c(GameContract::Account, 1),
            backpack: c(GameContract::Backpack, 2),
            avatar_customization: c(GameContract::AvatarCustomization, 3),
            inventory: c(GameContract::Inventory, 4),
            dust_token: c(GameContract::DustToken, 5),
            sync: c(GameContract::Sync, 6),
            create_account: c(GameContract::CreateAccount, 7),
        }
    }

    #[test]
    fn test_grants_target_every_upgradeable_game_contract() {
        let grants = deployed().authorization_grants();
        let targets: Vec<_> = grants.iter().map(|g| g.target).collect();
        assert_eq!(targets, GameContract::DEPLOYMENT_ORDER[..5].to_vec());
    }

    #[test]
    fn test_account_grant_includes_create_account_and_sync() {
        let grants = deployed().authorization_grants();
        assert_eq!(grants[0].target_address, Address::with_last_byte(1));
        assert_eq!(
            grants[0].grantees,
            vec![Address::with_last_byte(7), Address::with_last_byte(6)]
        );
        for grant in &grants[1..] {
            assert_eq!(grant.grantees, vec![Address::with_last_byte(6)]);
        }
    }

    #[test]
    fn test_in_order_matches_deployment_order() {
        let contracts = deployed();
        let order: Vec<_> = contracts.in_order().iter().map(|c| c.contract).collect();
        assert_eq!(order, GameContract::DEPLOYMENT_ORDER.to_vec());
    }

    #[test]
    fn test_fee() {
        let outcome = TxOutcome {
            tx_hash: Default::default(),
            contract_address: None,
            gas_used: 21_000,
            effective_gas_price: 2_000_000_000,
        };
        assert_eq!(outcome.fee(), U256::from(42_000_000_000_000u64));
    }
}
