//! Calendar feed aggregation engine.
//!
//! The pure core of the calmerge toolkit:
//! - parse .ics bytes into an owned [`Feed`] model,
//! - prune feeds to a recent window and drop overlong events,
//! - merge many feeds into one deduplicated feed,
//! - serialize deterministically back to wire format.
//!
//! All I/O (fetching, publishing, file handling) lives in the CLI crate;
//! everything here operates on already-fetched in-memory data.

pub mod error;
pub mod event;
pub mod feed;
pub mod filter;
pub mod identity;
pub mod merge;
pub mod serialize;
pub mod source;

pub use error::{CalMergeError, CalMergeResult};
pub use event::{EventTime, VEvent};
pub use feed::{Feed, FeedComponent, RawComponent, RawParam, RawProperty};
pub use filter::{
    duration_days, filter_recent, keep_if_recent, keep_if_short_enough, MAX_EVENT_DAYS,
    RECENT_DAYS,
};
pub use identity::EventKey;
pub use merge::Merger;
pub use serialize::{to_ics_bytes, to_ics_string};
pub use source::{load_sources, save_sources, Source};
