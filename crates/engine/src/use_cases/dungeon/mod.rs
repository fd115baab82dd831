//! Dungeon use cases: mj-side authoring and the public catalog.

use std::sync::Arc;

mod authoring;
mod catalog;
mod error;

pub use authoring::{DungeonAuthoring, StepInput};
pub use catalog::DungeonCatalog;
pub use error::DungeonError;

/// Container for dungeon use cases.
pub struct DungeonUseCases {
    pub authoring: Arc<DungeonAuthoring>,
    pub catalog: Arc<DungeonCatalog>,
}

impl DungeonUseCases {
    pub fn new(authoring: Arc<DungeonAuthoring>, catalog: Arc<DungeonCatalog>) -> Self {
        Self { authoring, catalog }
    }
}
