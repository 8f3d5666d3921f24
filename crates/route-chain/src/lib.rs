//! Linked segment chains for driver roads.
//!
//! A driver's road is persisted as unordered `RoadToSegment` rows, each of
//! which knows the hash of its previous and next segment. This crate turns
//! those rows back into an ordered [`Chain`], validates the single-path
//! invariant, splices a passenger stop into a chain, and selects the cheapest
//! insertion point among planner candidates.
//!
//! The crate is independent of the backend service types so the chain rules
//! can be exercised without any storage or transport.
//!
//! # Overview
//!
//! - [`Chain::from_edges`] reconstructs order from the head (`previous` is
//!   `None`) to the tail (`next` is `None`), rejecting forks, cycles, repeated
//!   hashes and orphaned rows.
//! - [`Chain::splice`] replaces one segment with the two segments produced by
//!   splitting it at a passenger stop.
//! - [`select_cheapest`] picks the minimum cost difference, keeping the first
//!   candidate met on a head-to-tail walk when costs tie.
//!
//! # Example
//!
//! ```
//! use route_chain::{Chain, RoadToSegment, SegmentHash, SplitPair};
//! use uuid::Uuid;
//!
//! let road_id = Uuid::new_v4();
//! let a = SegmentHash::new("a").expect("valid hash");
//! let b = SegmentHash::new("b").expect("valid hash");
//! let rows = vec![
//!     RoadToSegment::new(road_id, b.clone(), Some(a.clone()), None),
//!     RoadToSegment::new(road_id, a.clone(), None, Some(b.clone())),
//! ];
//!
//! let chain = Chain::from_edges(road_id, rows).expect("well-formed chain");
//! assert_eq!(chain.hashes().collect::<Vec<_>>(), vec![&a, &b]);
//!
//! let split = SplitPair::new(
//!     SegmentHash::new("a1").expect("valid hash"),
//!     SegmentHash::new("a2").expect("valid hash"),
//! )
//! .expect("distinct halves");
//! let passenger = Uuid::new_v4();
//! let spliced = chain.splice(&a, &split, passenger).expect("splice succeeds");
//! assert_eq!(spliced.len(), 3);
//! ```

mod chain;
mod edge;
mod error;
mod segment_hash;
mod selection;

pub use chain::{Chain, ChainLink, SplitPair};
pub use edge::{ChainVariant, RoadToSegment};
pub use error::{ChainError, SegmentHashError};
pub use segment_hash::SegmentHash;
pub use selection::{InsertionCandidate, select_cheapest};
