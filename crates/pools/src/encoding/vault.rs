//! `joinPool` and `exitPool` calls on the Balancer Vault.

pub use contracts::BalancerV2Vault::IVault::{
    ExitPoolRequest,
    JoinPoolRequest,
    exitPoolCall,
    joinPoolCall,
};
use {
    alloy_primitives::{Address, B256, Bytes, U256, address},
    alloy_sol_types::SolCall,
};

/// Address of the Vault, identical on every network it is deployed to.
pub const VAULT: Address = address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8");

pub fn join_pool(
    pool_id: B256,
    sender: Address,
    recipient: Address,
    assets: Vec<Address>,
    max_amounts_in: Vec<U256>,
    user_data: Bytes,
) -> joinPoolCall {
    joinPoolCall {
        poolId: pool_id,
        sender,
        recipient,
        request: JoinPoolRequest {
            assets,
            maxAmountsIn: max_amounts_in,
            userData: user_data,
            fromInternalBalance: false,
        },
    }
}

pub fn exit_pool(
    pool_id: B256,
    sender: Address,
    recipient: Address,
    assets: Vec<Address>,
    min_amounts_out: Vec<U256>,
    user_data: Bytes,
) -> exitPoolCall {
    exitPoolCall {
        poolId: pool_id,
        sender,
        recipient,
        request: ExitPoolRequest {
            assets,
            minAmountsOut: min_amounts_out,
            userData: user_data,
            toInternalBalance: false,
        },
    }
}

pub fn calldata(call: &impl SolCall) -> Bytes {
    call.abi_encode().into()
}
