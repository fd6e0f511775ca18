//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` (or a connection, when the call must join an open
//! transaction) as the first argument.

pub mod appeal_repo;
pub mod creator_repo;
pub mod dashboard_repo;
pub mod evidence_repo;
pub mod job_repo;

pub use appeal_repo::AppealRepo;
pub use creator_repo::CreatorRepo;
pub use dashboard_repo::DashboardRepo;
pub use evidence_repo::EvidenceRepo;
pub use job_repo::JobRepo;
