//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod company_repo;
pub mod event_repo;
pub mod invite_repo;
pub mod journey_repo;
pub mod role_repo;
pub mod session_repo;
pub mod training_repo;
pub mod user_repo;
pub mod workbook_repo;

pub use company_repo::CompanyRepo;
pub use event_repo::EventRepo;
pub use invite_repo::InviteRepo;
pub use journey_repo::JourneyRepo;
pub use role_repo::RoleRepo;
pub use session_repo::SessionRepo;
pub use training_repo::TrainingRepo;
pub use user_repo::UserRepo;
pub use workbook_repo::WorkbookRepo;
