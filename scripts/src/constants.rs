//! Constants used in the deploy scripts

use alloy_primitives::{b256, B256};

/// The artifact name of the account contract
pub const ACCOUNT_ARTIFACT: &str = "TownStoryAccountUpgradeable";

/// The artifact name of the backpack contract
pub const BACKPACK_ARTIFACT: &str = "TownStoryBackpackUpgradeable";

/// The artifact name of the avatar customization contract
pub const AVATAR_CUSTOMIZATION_ARTIFACT: &str = "AvatarCustomizationUpgradeable";

/// The artifact name of the inventory contract
pub const INVENTORY_ARTIFACT: &str = "TownStoryInventoryUpgradeable";

/// The artifact name of the dust token contract
pub const DUST_TOKEN_ARTIFACT: &str = "StarDustTokenUpgradeable";

/// The artifact name of the game sync contract
pub const SYNC_ARTIFACT: &str = "GameSyncUpgradeable";

/// The artifact name of the (non-upgradeable) account creation contract
pub const CREATE_ACCOUNT_ARTIFACT: &str = "TownStoryCreateAccount";

/// The artifact name of the TransparentUpgradeableProxy contract
///
/// Compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const PROXY_ARTIFACT: &str = "TransparentUpgradeableProxy";

/// The constructor parameters of the v5 `TransparentUpgradeableProxy`.
///
/// Earlier versions take the admin itself as their second parameter (`admin_`)
/// rather than the owner of a freshly deployed `ProxyAdmin`
pub const PROXY_CONSTRUCTOR_PARAMS: [&str; 3] = ["_logic", "initialOwner", "_data"];

/// The extension of a Hardhat artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// The default number of confirmations to wait for on each transaction
pub const DEFAULT_NUM_CONFIRMATIONS: u64 = 1;

/// The default RPC URL, a local Hardhat or Anvil node
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// The default Hardhat artifacts directory
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The suffix appended to a contract key for its implementation address
pub const IMPLEMENTATION_KEY_SUFFIX: &str = "_implementation";

/// The suffix appended to a contract key for its proxy admin address
pub const PROXY_ADMIN_KEY_SUFFIX: &str = "_proxy_admin";

/// The name of the authorization method called on each game contract
pub const ADD_GAME_OWNER_BATCH_METHOD: &str = "addGameOwnerBatch";

/// The default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";
