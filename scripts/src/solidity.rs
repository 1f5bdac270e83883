//! Definitions of Solidity functions called during deployment

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall, SolValue};

sol! {
    /// The methods shared by every upgradeable game contract
    interface IGameContract {
        function initialize() external;
        function addGameOwnerBatch(address[] memory owners) external;
    }

    /// The initializer of the game sync contract
    interface IGameSync {
        function initialize(
            address accountContract,
            address[3] memory itemContracts,
            address dustToken,
            address serverSigner
        ) external;
    }
}

/// Prepare calldata for the no-argument `initialize` method of a game contract
pub fn game_initialize_calldata() -> Vec<u8> {
    IGameContract::initializeCall {}.abi_encode()
}

/// Prepare calldata for the sync contract's `initialize` method
///
/// `item_contracts` is positional: backpack, avatar customization, inventory
pub fn sync_initialize_calldata(
    account_contract: Address,
    item_contracts: [Address; 3],
    dust_token: Address,
    server_signer: Address,
) -> Vec<u8> {
    IGameSync::initializeCall {
        accountContract: account_contract,
        itemContracts: item_contracts,
        dustToken: dust_token,
        serverSigner: server_signer,
    }
    .abi_encode()
}

/// Prepare calldata for `addGameOwnerBatch`
pub fn add_game_owner_batch_calldata(owners: Vec<Address>) -> Vec<u8> {
    IGameContract::addGameOwnerBatchCall { owners }.abi_encode()
}

/// ABI-encode the `TownStoryCreateAccount` constructor arguments
pub fn create_account_constructor_args(
    account_contract: Address,
    server_signer: Address,
) -> Vec<u8> {
    (account_contract, server_signer, server_signer).abi_encode_params()
}

/// ABI-encode the `TransparentUpgradeableProxy(logic, initialOwner, data)` constructor arguments
pub fn proxy_constructor_args(
    implementation: Address,
    initial_owner: Address,
    init_calldata: Vec<u8>,
) -> Vec<u8> {
    (implementation, initial_owner, Bytes::from(init_calldata)).abi_encode_params()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use alloy_sol_types::{SolCall, SolValue};

    use super::{
        add_game_owner_batch_calldata, create_account_constructor_args, game_initialize_calldata,
        proxy_constructor_args, sync_initialize_calldata, IGameContract, IGameSync,
    };

    #[test]
    fn test_game_initialize_is_bare_selector() {
        let calldata = game_initialize_calldata();
        assert_eq!(calldata, IGameContract::initializeCall::SELECTOR.to_vec());
        // keccak256("initialize()")[..4]
        assert_eq!(calldata, vec![0x81, 0x29, 0xfc, 0x1c]);
    }

    #[test]
    fn test_sync_initialize_item_order() {
        let account = Address::with_last_byte(1);
        let items = [
            Address::with_last_byte(2),
            Address::with_last_byte(3),
            Address::with_last_byte(4),
        ];
        let dust = Address::with_last_byte(5);
        let signer = Address::with_last_byte(6);

        let calldata = sync_initialize_calldata(account, items, dust, signer);
        let decoded = IGameSync::initializeCall::abi_decode(&calldata).unwrap();

        assert_eq!(decoded.accountContract, account);
        assert_eq!(decoded.itemContracts, items);
        assert_eq!(decoded.dustToken, dust);
        assert_eq!(decoded.serverSigner, signer);
        // selector + 6 static words, the fixed-size array is encoded inline
        assert_eq!(calldata.len(), 4 + 6 * 32);
    }

    #[test]
    fn test_add_game_owner_batch_calldata() {
        let owners = vec![Address::with_last_byte(7), Address::with_last_byte(8)];
        let calldata = add_game_owner_batch_calldata(owners.clone());
        let decoded = IGameContract::addGameOwnerBatchCall::abi_decode(&calldata).unwrap();
        assert_eq!(decoded.owners, owners);
    }

    #[test]
    fn test_create_account_args_repeat_signer() {
        let account = Address::with_last_byte(1);
        let signer = Address::with_last_byte(9);
        let args = create_account_constructor_args(account, signer);

        let (a, s0, s1) = <(Address, Address, Address)>::abi_decode_params(&args).unwrap();
        assert_eq!(a, account);
        assert_eq!(s0, signer);
        assert_eq!(s1, signer);
    }

    #[test]
    fn test_proxy_args_embed_initializer() {
        let implementation = Address::with_last_byte(1);
        let owner = Address::with_last_byte(2);
        let init = game_initialize_calldata();
        let args = proxy_constructor_args(implementation, owner, init.clone());

        let (logic, admin_owner, data) =
            <(Address, Address, alloy_primitives::Bytes)>::abi_decode_params(&args).unwrap();
        assert_eq!(logic, implementation);
        assert_eq!(admin_owner, owner);
        assert_eq!(data.to_vec(), init);
    }
}
