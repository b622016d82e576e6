//! Tablewarden Core
//!
//! Domain types shared by the reconciliation controller: table typing,
//! per-segment metadata views, segment name parsing, and the pure interval
//! math used for continuity checking.
//!
//! ## What Lives Here
//!
//! - **Table types**: offline (bulk segment pushes) vs realtime (continuous
//!   stream ingestion), derived from the table name suffix
//! - **Segment facts**: the per-segment view validators operate on (time
//!   interval, push/refresh times, document counts, naming)
//! - **Segment names**: the single parser that turns string segment names
//!   into a tagged consumer-segment variant
//! - **Interval math**: gap detection over time-partitioned segment
//!   sequences
//!
//! This crate is a leaf: no async, no I/O, no cluster state. Everything in
//! it is deterministic and directly unit-testable.

pub mod interval;
pub mod segment_name;
pub mod types;

pub use interval::{
    compute_missing_intervals, count_missing_segments, is_valid_timestamp, normalize_frequency,
    TimeInterval,
};
pub use segment_name::ConsumerSegment;
pub use types::{SegmentFacts, TableType};
