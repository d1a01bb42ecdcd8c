//! ABI encoding of the Vault `userData` payloads and of `joinPool`/`exitPool`
//! calldata.

mod recovery;
mod user_data;
pub mod vault;

pub use {
    recovery::{RECOVERY_EXIT_KIND, decode_recovery_exit, encode_recovery_exit},
    user_data::{
        COMPOSABLE_STABLE,
        ExitKind,
        ExitUserData,
        JoinKind,
        JoinUserData,
        STABLE,
        UserDataLayout,
        WEIGHTED,
    },
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0:?} is not supported by this pool")]
    UnsupportedJoinKind(JoinKind),
    #[error("{0:?} is not supported by this pool")]
    UnsupportedExitKind(ExitKind),
    #[error("unknown user data kind {0}")]
    UnknownKind(alloy_primitives::U256),
    #[error("user data is too short")]
    Truncated,
    #[error(transparent)]
    Abi(#[from] alloy_sol_types::Error),
}
