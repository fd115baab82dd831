//! Run operation errors.

use crate::infrastructure::ports::RepoError;

/// Errors that can occur while starting runs or attempting steps.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("dungeon not found")]
    DungeonNotFound,
    #[error("dungeon is not published")]
    DungeonNotPublished,
    #[error("player not found")]
    PlayerNotFound,
    #[error("run not found")]
    RunNotFound,
    #[error("boss step not found")]
    StepNotFound,
    #[error("an active run already exists for this dungeon")]
    ActiveRunExists,
    #[error("run is not active")]
    RunNotActive,
    #[error("run belongs to another player")]
    NotRunOwner,
    #[error("wrong step order: expected step {expected}, got step {got}")]
    WrongStepOrder { expected: u32, got: u32 },
    #[error("{distance_m:.1}m away from the boss, radius is {radius_m:.1}m")]
    NotInRange { distance_m: f64, radius_m: f64 },
    #[error("attempt already handled for this step")]
    AlreadyHandled,
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}
