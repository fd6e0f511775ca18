//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching database rows
//! - `Deserialize` create / update DTOs
//! - read-model rows for joined queries

pub mod appeal;
pub mod creator;
pub mod dashboard;
pub mod job;
