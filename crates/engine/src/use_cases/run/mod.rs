//! Run use cases: starting dungeons and attempting boss steps.

use std::sync::Arc;

mod attempt_step;
mod error;
mod queries;
mod start_run;
mod types;

pub use attempt_step::AttemptStep;
pub use error::RunError;
pub use queries::RunQueries;
pub use start_run::StartRun;
pub use types::AttemptOutcome;

/// Container for run use cases.
pub struct RunUseCases {
    pub start: Arc<StartRun>,
    pub attempt: Arc<AttemptStep>,
    pub queries: Arc<RunQueries>,
}

impl RunUseCases {
    pub fn new(start: Arc<StartRun>, attempt: Arc<AttemptStep>, queries: Arc<RunQueries>) -> Self {
        Self {
            start,
            attempt,
            queries,
        }
    }
}
