use {
    super::Error,
    alloy_primitives::{Bytes, U256},
    alloy_sol_types::SolValue,
};

/// Payload of a join request. Which variants a pool accepts, and under which
/// kind tag, depends on its [`UserDataLayout`].
#[derive(Clone, Debug, Eq, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(JoinKind))]
pub enum JoinUserData {
    Init {
        amounts_in: Vec<U256>,
    },
    ExactTokensInForBptOut {
        amounts_in: Vec<U256>,
        min_bpt_amount_out: U256,
    },
    TokenInForExactBptOut {
        bpt_amount_out: U256,
        enter_token_index: U256,
    },
    AllTokensInForExactBptOut {
        bpt_amount_out: U256,
    },
}

/// Payload of an exit request.
///
/// `ExactBptInForTokensOut` is the proportional exit, called
/// `EXACT_BPT_IN_FOR_ALL_TOKENS_OUT` by composable stable pools.
#[derive(Clone, Debug, Eq, PartialEq, strum::EnumDiscriminants)]
#[strum_discriminants(name(ExitKind))]
pub enum ExitUserData {
    ExactBptInForOneTokenOut {
        bpt_amount_in: U256,
        exit_token_index: U256,
    },
    ExactBptInForTokensOut {
        bpt_amount_in: U256,
    },
    BptInForExactTokensOut {
        amounts_out: Vec<U256>,
        max_bpt_amount_in: U256,
    },
}

/// Maps join and exit kinds to the numeric tags a pool family expects as the
/// first word of its user data. The tag of a kind is its position.
#[derive(Clone, Copy, Debug)]
pub struct UserDataLayout {
    joins: &'static [JoinKind],
    exits: &'static [ExitKind],
}

pub const WEIGHTED: UserDataLayout = UserDataLayout {
    joins: &[
        JoinKind::Init,
        JoinKind::ExactTokensInForBptOut,
        JoinKind::TokenInForExactBptOut,
        JoinKind::AllTokensInForExactBptOut,
    ],
    exits: &[
        ExitKind::ExactBptInForOneTokenOut,
        ExitKind::ExactBptInForTokensOut,
        ExitKind::BptInForExactTokensOut,
    ],
};

/// Legacy stable and meta stable pools.
pub const STABLE: UserDataLayout = UserDataLayout {
    joins: &[
        JoinKind::Init,
        JoinKind::ExactTokensInForBptOut,
        JoinKind::TokenInForExactBptOut,
    ],
    exits: &[
        ExitKind::ExactBptInForOneTokenOut,
        ExitKind::ExactBptInForTokensOut,
        ExitKind::BptInForExactTokensOut,
    ],
};

pub const COMPOSABLE_STABLE: UserDataLayout = UserDataLayout {
    joins: &[
        JoinKind::Init,
        JoinKind::ExactTokensInForBptOut,
        JoinKind::TokenInForExactBptOut,
        JoinKind::AllTokensInForExactBptOut,
    ],
    exits: &[
        ExitKind::ExactBptInForOneTokenOut,
        ExitKind::BptInForExactTokensOut,
        ExitKind::ExactBptInForTokensOut,
    ],
};

impl UserDataLayout {
    pub fn join_tag(&self, kind: JoinKind) -> Option<U256> {
        tag_of(self.joins, kind)
    }

    pub fn exit_tag(&self, kind: ExitKind) -> Option<U256> {
        tag_of(self.exits, kind)
    }

    pub fn encode_join(&self, data: &JoinUserData) -> Result<Bytes, Error> {
        let kind = JoinKind::from(data);
        let tag = self
            .join_tag(kind)
            .ok_or(Error::UnsupportedJoinKind(kind))?;
        let encoded = match data {
            JoinUserData::Init { amounts_in } => (tag, amounts_in.clone()).abi_encode_params(),
            JoinUserData::ExactTokensInForBptOut {
                amounts_in,
                min_bpt_amount_out,
            } => (tag, amounts_in.clone(), *min_bpt_amount_out).abi_encode_params(),
            JoinUserData::TokenInForExactBptOut {
                bpt_amount_out,
                enter_token_index,
            } => (tag, *bpt_amount_out, *enter_token_index).abi_encode_params(),
            JoinUserData::AllTokensInForExactBptOut { bpt_amount_out } => {
                (tag, *bpt_amount_out).abi_encode_params()
            }
        };
        Ok(encoded.into())
    }

    pub fn decode_join(&self, data: &[u8]) -> Result<JoinUserData, Error> {
        let tag = leading_tag(data)?;
        let kind = kind_of(self.joins, tag)?;
        Ok(match kind {
            JoinKind::Init => {
                let (_, amounts_in) = <(U256, Vec<U256>)>::abi_decode_params(data)?;
                JoinUserData::Init { amounts_in }
            }
            JoinKind::ExactTokensInForBptOut => {
                let (_, amounts_in, min_bpt_amount_out) =
                    <(U256, Vec<U256>, U256)>::abi_decode_params(data)?;
                JoinUserData::ExactTokensInForBptOut {
                    amounts_in,
                    min_bpt_amount_out,
                }
            }
            JoinKind::TokenInForExactBptOut => {
                let (_, bpt_amount_out, enter_token_index) =
                    <(U256, U256, U256)>::abi_decode_params(data)?;
                JoinUserData::TokenInForExactBptOut {
                    bpt_amount_out,
                    enter_token_index,
                }
            }
            JoinKind::AllTokensInForExactBptOut => {
                let (_, bpt_amount_out) = <(U256, U256)>::abi_decode_params(data)?;
                JoinUserData::AllTokensInForExactBptOut { bpt_amount_out }
            }
        })
    }

    pub fn encode_exit(&self, data: &ExitUserData) -> Result<Bytes, Error> {
        let kind = ExitKind::from(data);
        let tag = self
            .exit_tag(kind)
            .ok_or(Error::UnsupportedExitKind(kind))?;
        let encoded = match data {
            ExitUserData::ExactBptInForOneTokenOut {
                bpt_amount_in,
                exit_token_index,
            } => (tag, *bpt_amount_in, *exit_token_index).abi_encode_params(),
            ExitUserData::ExactBptInForTokensOut { bpt_amount_in } => {
                (tag, *bpt_amount_in).abi_encode_params()
            }
            ExitUserData::BptInForExactTokensOut {
                amounts_out,
                max_bpt_amount_in,
            } => (tag, amounts_out.clone(), *max_bpt_amount_in).abi_encode_params(),
        };
        Ok(encoded.into())
    }

    pub fn decode_exit(&self, data: &[u8]) -> Result<ExitUserData, Error> {
        let tag = leading_tag(data)?;
        let kind = kind_of(self.exits, tag)?;
        Ok(match kind {
            ExitKind::ExactBptInForOneTokenOut => {
                let (_, bpt_amount_in, exit_token_index) =
                    <(U256, U256, U256)>::abi_decode_params(data)?;
                ExitUserData::ExactBptInForOneTokenOut {
                    bpt_amount_in,
                    exit_token_index,
                }
            }
            ExitKind::ExactBptInForTokensOut => {
                let (_, bpt_amount_in) = <(U256, U256)>::abi_decode_params(data)?;
                ExitUserData::ExactBptInForTokensOut { bpt_amount_in }
            }
            ExitKind::BptInForExactTokensOut => {
                let (_, amounts_out, max_bpt_amount_in) =
                    <(U256, Vec<U256>, U256)>::abi_decode_params(data)?;
                ExitUserData::BptInForExactTokensOut {
                    amounts_out,
                    max_bpt_amount_in,
                }
            }
        })
    }
}

fn tag_of<K: PartialEq>(kinds: &[K], kind: K) -> Option<U256> {
    kinds
        .iter()
        .position(|k| *k == kind)
        .map(U256::from)
}

fn kind_of<K: Copy>(kinds: &[K], tag: U256) -> Result<K, Error> {
    usize::try_from(tag)
        .ok()
        .and_then(|index| kinds.get(index).copied())
        .ok_or(Error::UnknownKind(tag))
}

pub(super) fn leading_tag(data: &[u8]) -> Result<U256, Error> {
    data.get(..32)
        .map(U256::from_be_slice)
        .ok_or(Error::Truncated)
}
