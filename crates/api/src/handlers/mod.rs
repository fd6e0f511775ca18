//! Request handlers.
//!
//! Each submodule provides the async handler functions for one route group.
//! Handlers delegate to the repositories in `seekreap_db` (or to the
//! submission engine) and map errors via [`crate::error::AppError`].

pub mod admin;
pub mod appeals;
pub mod creators;
pub mod submissions;
