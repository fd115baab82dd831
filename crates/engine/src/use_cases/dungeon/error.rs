use thiserror::Error;

use crate::infrastructure::ports::RepoError;

#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("dungeon not found")]
    DungeonNotFound,

    #[error("step not found")]
    StepNotFound,

    #[error("dungeon belongs to another mj")]
    NotDungeonOwner,

    #[error("dungeon has no steps to publish")]
    NoSteps,

    #[error("step radius must be positive")]
    InvalidRadius,

    #[error("step order {0} is already taken")]
    OrderTaken(u32),

    #[error("step ids are not a permutation of the dungeon's steps")]
    InvalidReorder,

    #[error(transparent)]
    Repo(#[from] RepoError),
}
