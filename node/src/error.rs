use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Staking(#[from] poline_staking::StakingError),

    #[error(transparent)]
    Circles(#[from] poline_circles::CircleError),

    #[error(transparent)]
    Oracle(#[from] poline_oracle::OracleError),

    #[error(transparent)]
    Disputes(#[from] poline_disputes::DisputeError),

    #[error(transparent)]
    Dao(#[from] poline_dao::DaoError),

    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] bincode::Error),
}
