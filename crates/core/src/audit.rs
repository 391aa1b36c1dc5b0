//! The auditable capability: who created / last changed a record, and when.

use chrono::Utc;

use crate::time::humanize_since;
use crate::types::{DbId, Timestamp};

pub trait Auditable {
    fn created_on(&self) -> Timestamp;
    fn changed_on(&self) -> Timestamp;
    fn created_by(&self) -> Option<DbId>;
    fn changed_by(&self) -> Option<DbId>;

    /// `changed_on` as an age relative to now ("3 hours ago").
    fn changed_on_humanized(&self) -> String {
        humanize_since(self.changed_on(), Utc::now())
    }
}
