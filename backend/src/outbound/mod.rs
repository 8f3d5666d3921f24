//! Outbound adapters implementing driven ports.
//!
//! - **memory**: in-process store for riders, capacity, road chains, and
//!   matching.
//! - **oracle**: geometric segment oracle.
//!
//! Adapters translate between domain types and their storage representation
//! and contain no business rules.

pub mod memory;
pub mod oracle;

pub use memory::InMemoryStore;
pub use oracle::{DEFAULT_AVERAGE_SPEED_KMH, GeometricSegmentOracle};
