use {
    super::Error,
    alloy_primitives::{Bytes, U256},
    alloy_sol_types::SolValue,
};

/// Kind tag shared by the recovery mode exit of every pool type.
pub const RECOVERY_EXIT_KIND: U256 = U256::from_limbs([255, 0, 0, 0]);

pub fn encode_recovery_exit(bpt_amount_in: U256) -> Bytes {
    (RECOVERY_EXIT_KIND, bpt_amount_in)
        .abi_encode_params()
        .into()
}

/// Returns the kind tag and the BPT amount of recovery exit user data. The
/// tag is returned as found, it is not checked against
/// [`RECOVERY_EXIT_KIND`].
pub fn decode_recovery_exit(data: &[u8]) -> Result<(U256, U256), Error> {
    Ok(<(U256, U256)>::abi_decode_params(data)?)
}
