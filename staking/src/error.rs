use thiserror::Error;

#[derive(Debug, Error)]
pub enum StakingError {
    #[error("stake amount must be greater than zero")]
    ZeroAmount,

    #[error("{0} has no active stake")]
    NoStake(String),

    #[error("{0} already has a pending unstake request")]
    UnstakeAlreadyRequested(String),

    #[error("{0} has no pending unstake request")]
    NoUnstakeRequested(String),

    #[error("unstake cooldown not complete: {remaining_secs}s remaining")]
    CooldownNotComplete { remaining_secs: u64 },

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),

    #[error("arithmetic overflow in stake accounting")]
    Overflow,
}
