use thiserror::Error;

use crate::infrastructure::auth::AuthError;
use crate::infrastructure::ports::RepoError;

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("email already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("player not found")]
    PlayerNotFound,

    #[error("not allowed to access this player")]
    NotAllowed,

    #[error(transparent)]
    Token(#[from] AuthError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}
