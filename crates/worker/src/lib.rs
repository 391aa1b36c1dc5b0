//! Background thumbnail rendering for sources.
//!
//! The worker claims queued jobs from `thumbnail_jobs`, renders a preview
//! card from the current state of the source and caches it in
//! `source_thumbnails` keyed by the source digest.

pub mod error;
pub mod render;
pub mod worker;
