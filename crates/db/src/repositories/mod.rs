//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Lookups that must run inside a
//! caller's transaction take `&mut PgConnection` instead.

pub mod dataset_repo;
pub mod source_repo;
pub mod source_thumbnail_repo;
pub mod thumbnail_job_repo;
pub mod user_repo;

pub use dataset_repo::DatasetRepo;
pub use source_repo::SourceRepo;
pub use source_thumbnail_repo::SourceThumbnailRepo;
pub use thumbnail_job_repo::ThumbnailJobRepo;
pub use user_repo::UserRepo;
