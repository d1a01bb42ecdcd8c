pub mod networks {
    pub const MAINNET: u64 = 1;
    pub const GNOSIS: u64 = 100;
    pub const SEPOLIA: u64 = 11155111;
    pub const ARBITRUM_ONE: u64 = 42161;
    pub const BASE: u64 = 8453;
    pub const POLYGON: u64 = 137;
    pub const AVALANCHE: u64 = 43114;
    pub const OPTIMISM: u64 = 10;
}

/// Declares the bindings of a contract from its inline Solidity interface
/// together with the addresses it is deployed at on each network. Without an
/// interface only the deployments are declared.
#[macro_export]
macro_rules! bindings {
    ($contract:ident, { $($interface:tt)* }, $deployment_info:expr) => {
        #[allow(non_snake_case)]
        pub mod $contract {
            alloy_sol_types::sol! {
                #[allow(missing_docs)]
                #[sol(all_derives)]
                $($interface)*
            }

            $crate::deployments!($deployment_info);
        }
    };
    ($contract:ident, $deployment_info:expr) => {
        #[allow(non_snake_case)]
        pub mod $contract {
            $crate::deployments!($deployment_info);
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! deployments {
    ($deployment_info:expr) => {
        use {
            std::{collections::HashMap, sync::LazyLock},
            alloy_primitives::{address, Address},
            $crate::networks::*,
        };

        pub static DEPLOYMENT_INFO: LazyLock<HashMap<u64, Address>> =
            LazyLock::new(|| $deployment_info);

        /// Address the contract is deployed at on the given chain.
        pub fn deployment_address(chain_id: u64) -> Option<Address> {
            DEPLOYMENT_INFO.get(&chain_id).copied()
        }
    };
}

bindings!(
    BalancerV2Vault,
    {
        interface IVault {
            struct JoinPoolRequest {
                address[] assets;
                uint256[] maxAmountsIn;
                bytes userData;
                bool fromInternalBalance;
            }

            struct ExitPoolRequest {
                address[] assets;
                uint256[] minAmountsOut;
                bytes userData;
                bool toInternalBalance;
            }

            function joinPool(
                bytes32 poolId,
                address sender,
                address recipient,
                JoinPoolRequest memory request
            ) external payable;

            function exitPool(
                bytes32 poolId,
                address sender,
                address recipient,
                ExitPoolRequest memory request
            ) external;
        }
    },
    maplit::hashmap! {
        MAINNET => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        GNOSIS => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        SEPOLIA => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        ARBITRUM_ONE => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        BASE => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        POLYGON => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        AVALANCHE => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
        OPTIMISM => address!("0xBA12222222228d8Ba445958a75a0704d566BF2C8"),
    }
);

bindings!(
    WETH9,
    maplit::hashmap! {
        MAINNET => address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"),
        GNOSIS => address!("0xe91D153E0b41518A2Ce8Dd3D7944Fa863463a97d"),
        SEPOLIA => address!("0xfFf9976782d46CC05630D1f6eBAb18b2324d6B14"),
        ARBITRUM_ONE => address!("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"),
        BASE => address!("0x4200000000000000000000000000000000000006"),
        POLYGON => address!("0x0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"),
        AVALANCHE => address!("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7"),
        OPTIMISM => address!("0x4200000000000000000000000000000000000006"),
    }
);

bindings!(
    BalancerGovernanceToken,
    maplit::hashmap! {
        MAINNET => address!("0xba100000625a3754423978a60c9317c58a424e3d"),
        GNOSIS => address!("0x7eF541E2a22058048904fE5744f9c7E4C57AF717"),
        SEPOLIA => address!("0xb19382073c7a0addbb56ac6af1808fa49e377b75"),
        ARBITRUM_ONE => address!("0x040d1EdC9569d4Bab2D15287Dc5A4F10F56a56B8"),
        BASE => address!("0x4158734d47fc9692176b5085e0f52ee0da5d47f1"),
        POLYGON => address!("0x9a71012b13ca4d3d0cdc72a177df3ef03b0e76a3"),
        AVALANCHE => address!("0xe15bcb9e0ea69e6ab9fa080c4c4a5632896298c3"),
        OPTIMISM => address!("0xfe8b128ba8c78aabc59d4c64cee7ff28e9379921"),
    }
);
