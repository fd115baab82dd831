//! Backend E2E integration tests.
//!
//! Every test drives the real router over a throwaway SQLite file, so the
//! whole stack is in play: extractors, validation, use cases, the ledger
//! and the error envelope.
//!
//! ```bash
//! cargo test -p dungeons-engine --lib e2e_tests
//! ```

mod e2e_helpers;

mod market_flow_tests;
mod run_flow_tests;
