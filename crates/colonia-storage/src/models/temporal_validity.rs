//! Trait for records that stop counting at an optional end instant
//!
//! Visitor passes and announcements both carry an "in effect" flag and an
//! optional expiry. The window check lives here; implementors only expose
//! their fields. Callers always pass the evaluation instant so the SQL
//! procedures and the in-memory filters agree on the same `now`.
//!
//! ```
//! use colonia_storage::models::TemporalValidity;
//! use chrono::{DateTime, Duration, Utc};
//!
//! struct Notice {
//!     expires: Option<DateTime<Utc>>,
//! }
//!
//! impl TemporalValidity for Notice {
//!     fn is_active(&self) -> bool {
//!         true
//!     }
//!
//!     fn validity_end(&self) -> Option<DateTime<Utc>> {
//!         self.expires
//!     }
//! }
//!
//! # fn main() {
//! let now = Utc::now();
//! let notice = Notice { expires: Some(now + Duration::hours(1)) };
//! assert!(notice.is_valid_at(now));
//! assert!(!notice.is_valid_at(now + Duration::hours(1)));
//! # }
//! ```

use chrono::{DateTime, Utc};

pub trait TemporalValidity {
    /// Whether the record is in effect at all
    ///
    /// Inactive records are invalid regardless of their expiry.
    fn is_active(&self) -> bool;

    /// Instant from which the record is no longer usable, if bounded
    ///
    /// The end is exclusive: a record is only valid while `now < end`.
    fn validity_end(&self) -> Option<DateTime<Utc>>;

    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.validity_end().is_none_or(|end| now < end)
    }
}
