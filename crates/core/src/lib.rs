//! SeekReap domain layer.
//!
//! Pure types, state machines and validation shared by the DB and API
//! crates. Nothing in here performs I/O.

pub mod appeal;
pub mod creator;
pub mod error;
pub mod forwarding;
pub mod job;
pub mod submission;
pub mod types;
