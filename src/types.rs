//! Core types for the partitioned namespace.

/// INodeId: stable identity of a namespace node
pub type INodeId = u64;

/// PartitionKey: storage partition a node's record lives in
pub type PartitionKey = u64;

/// Depth: number of ancestors between a node and the root (root = 0)
pub type Depth = u16;

/// Id of the root directory
pub const ROOT_INODE_ID: INodeId = 1;

/// Sentinel parent id of the root directory
pub const ROOT_PARENT_ID: INodeId = 0;

/// Local name of the root directory
pub const ROOT_NAME: &[u8] = b"";

/// Depth of the root directory
pub const ROOT_DIR_DEPTH: Depth = 0;

/// Partition key of the root directory
pub const ROOT_DIR_PARTITION_KEY: PartitionKey = ROOT_PARENT_ID;
