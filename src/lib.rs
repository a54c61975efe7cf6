//! nsmeta: Partitioned Namespace Metadata
//!
//! The directory tree of a distributed file-system namespace kept as flat
//! records in a transactional store. Every inode lives under the composite
//! key `(partition_key, parent_id, name)`; shallow levels of the tree are
//! spread over partitions by hashing while deeper levels are colocated with
//! their parent so a directory listing stays in one partition.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod store;
pub mod tooling;
pub mod tree;
pub mod types;
