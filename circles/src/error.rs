use poline_types::EntityId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CircleError {
    #[error("circle name must not be empty")]
    EmptyName,

    #[error("circle scope set must not be empty")]
    EmptyScopes,

    #[error("circle {0} already exists")]
    DuplicateCircle(EntityId),

    #[error("circle {0} not found")]
    NotFound(EntityId),

    #[error("circle {0} is not active")]
    Inactive(EntityId),

    #[error("{member} is already a member of circle {circle}")]
    AlreadyMember { circle: EntityId, member: String },

    #[error("{member} is not a member of circle {circle}")]
    NotMember { circle: EntityId, member: String },

    #[error("joining circle {circle} requires a stake of {required}, {held} held")]
    InsufficientStake {
        circle: EntityId,
        required: u128,
        held: u128,
    },

    #[error("{0} is not authorized for this operation")]
    Unauthorized(String),
}
