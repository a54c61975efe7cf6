//! Integration tests for the partitioned namespace tree

mod child_mutation;
mod path_resolution;
mod properties;
mod sled_store;
mod subtree;
mod support;
mod transactions;
