//! Use case layer.
//!
//! One module per operation area. Each area owns its error enum and a
//! container struct that the application wires once at startup; HTTP
//! handlers only ever talk to these containers.

pub mod dungeon;
pub mod market;
pub mod player;
pub mod run;
