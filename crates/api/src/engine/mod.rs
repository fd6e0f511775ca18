//! Submission engine.
//!
//! [`gateway`] accepts new submissions and stores them as pending jobs.
//! [`forwarder`] hands them to the external processing tier.

pub mod forwarder;
pub mod gateway;
