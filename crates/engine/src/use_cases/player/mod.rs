//! Player use cases: accounts, sessions, profiles and inventory reads.

use std::sync::Arc;

mod error;
mod login;
mod queries;
mod register;
mod types;
mod update_profile;

pub use error::PlayerError;
pub use login::Login;
pub use queries::PlayerQueries;
pub use register::Register;
pub use types::AuthSession;
pub use update_profile::UpdateProfile;

/// Container for player use cases.
pub struct PlayerUseCases {
    pub register: Arc<Register>,
    pub login: Arc<Login>,
    pub update: Arc<UpdateProfile>,
    pub queries: Arc<PlayerQueries>,
}

impl PlayerUseCases {
    pub fn new(
        register: Arc<Register>,
        login: Arc<Login>,
        update: Arc<UpdateProfile>,
        queries: Arc<PlayerQueries>,
    ) -> Self {
        Self {
            register,
            login,
            update,
            queries,
        }
    }
}
