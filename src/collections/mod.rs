//! Collections - ordered sequence primitives
//!
//! The simulator keeps its memory map and ready pool in two small
//! purpose-built containers rather than pointer-linked nodes:
//!
//! - `list`: a slab-backed doubly-linked sequence with stable handles,
//!   backing the memory arena and its size-sorted holes index.
//! - `heap`: a binary min-heap over `Ord`, backing the shortest-job-first
//!   ready pool.

pub mod heap;
pub mod list;

pub use heap::MinHeap;
pub use list::{LinkedSequence, NodeRef};
